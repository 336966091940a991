//! Borrowed serialization events

/// One structural event, as produced by a mapping layer
///
/// Feed these to [`TagWriter::write_event`](crate::TagWriter::write_event)
/// to drive the writer from an event stream instead of method calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEvent<'a> {
    StartDocument {
        encoding: Option<&'a str>,
        standalone: Option<bool>,
    },
    DocType(&'a str),
    StartTag {
        namespace: Option<&'a str>,
        name: &'a str,
    },
    Attribute {
        namespace: Option<&'a str>,
        name: &'a str,
        value: &'a str,
    },
    Namespace {
        prefix: &'a str,
        uri: Option<&'a str>,
    },
    Text(&'a str),
    IgnorableWhitespace(&'a str),
    CData(&'a str),
    Comment(&'a str),
    ProcessingInstruction(&'a str),
    EntityRef(&'a str),
    EndTag {
        namespace: Option<&'a str>,
        name: &'a str,
    },
    EndDocument,
    Flush,
}

impl<'a> XmlEvent<'a> {
    /// Shorthand for a start tag
    pub fn start(namespace: Option<&'a str>, name: &'a str) -> Self {
        XmlEvent::StartTag { namespace, name }
    }

    /// Shorthand for an end tag
    pub fn end(namespace: Option<&'a str>, name: &'a str) -> Self {
        XmlEvent::EndTag { namespace, name }
    }
}
