//! Type definitions shared by the writer's internal stacks

/// Namespace URI bound to the reserved `xml` prefix
pub const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace URI of `xmlns` declaration attributes
pub const XMLNS_ATTRIBUTE_NS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Local name of the default namespace declaration attribute
pub const XMLNS_ATTRIBUTE: &str = "xmlns";

/// Feature toggling pretty-printed output for the current depth
pub const FEATURE_INDENT_OUTPUT: &str = "http://xmlpull.org/v1/doc/features.html#indent-output";

/// One open (or pending) element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFrame {
    /// Namespace URI, `None` for elements in no namespace
    pub namespace: Option<String>,
    /// Prefix the start tag was written with, empty for unprefixed
    pub prefix: String,
    /// Local name
    pub name: String,
}

impl ElementFrame {
    pub fn new(namespace: Option<&str>, prefix: &str, name: &str) -> Self {
        ElementFrame {
            namespace: namespace.map(str::to_string),
            prefix: prefix.to_string(),
            name: name.to_string(),
        }
    }

    /// Whether this frame is the element identified by `(namespace, name)`
    pub fn matches(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.name == name
    }

    /// Qualified name as it appears in the tag
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.prefix, self.name)
        }
    }
}

/// A prefix to namespace binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
    /// Whether the `xmlns` attribute has been emitted
    pub written: bool,
}

impl NamespaceBinding {
    pub fn new(prefix: &str, uri: &str, written: bool) -> Self {
        NamespaceBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            written,
        }
    }
}

/// Normalize an optional namespace so `Some("")` and `None` compare equal
#[inline]
pub(crate) fn non_empty(namespace: Option<&str>) -> Option<&str> {
    namespace.filter(|ns| !ns.is_empty())
}
