//! Streaming tag writer with deferred start-tag closing
//!
//! A start tag stays *pending* (`<name` written, `>` not yet) until the next
//! event arrives, so attributes and namespace declarations can still be
//! appended and an element without children can be closed as `<name />`.

use super::escape::{escape, EscapePolicy, Quote};
use super::prefix::{self, PrefixGenerator};
use super::scope::ScopeStack;
use super::sink::XmlSink;
use crate::config::{LineEnding, WriterConfig};
use crate::error::{Result, XmlWriteError};
use crate::event::XmlEvent;
use crate::types::{
    non_empty, ElementFrame, NamespaceBinding, FEATURE_INDENT_OUTPUT, XMLNS_ATTRIBUTE,
    XMLNS_ATTRIBUTE_NS_URI,
};
use log::{debug, trace, warn};
use std::io::Write;

/// Whether a start tag is still open for attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    /// No unclosed start tag
    Settled,
    /// `<name` written; attributes and namespaces may follow
    Pending,
}

/// Namespace-aware streaming XML writer
///
/// One writer serializes one document into one sink, strictly forward.
///
/// Output is buffered. Call [`end_document`](Self::end_document),
/// [`flush`](Self::flush) or [`into_inner`](Self::into_inner) before dropping
/// the writer; up to 4 KiB of unflushed output is discarded on drop.
///
/// # Examples
///
/// ```
/// use xmlstream_writer::TagWriter;
///
/// let mut writer = TagWriter::new(Vec::new());
/// writer.start_tag(None, "root")?;
/// writer.namespace("ns1", Some("urn:a"))?;
/// writer.start_tag(Some("urn:a"), "child")?;
/// writer.text("x<y")?;
/// writer.end_tag(Some("urn:a"), "child")?;
/// writer.end_tag(None, "root")?;
///
/// let xml = String::from_utf8(writer.into_inner()?).unwrap();
/// assert_eq!(xml, r#"<root xmlns:ns1="urn:a"><ns1:child>x&lt;y</ns1:child></root>"#);
/// # Ok::<(), xmlstream_writer::XmlWriteError>(())
/// ```
pub struct TagWriter<W: Write> {
    sink: XmlSink<W>,
    config: WriterConfig,
    state: TagState,
    scope: ScopeStack,
    prefixes: PrefixGenerator,
    encoding: Option<String>,
    policy: EscapePolicy,
    /// (prefix, URI) pairs used by attributes of the pending start tag
    attribute_prefixes: Vec<(String, String)>,
}

impl<W: Write> TagWriter<W> {
    /// Create a writer with default settings and no declared encoding
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, WriterConfig::default())
    }

    pub fn with_config(writer: W, config: WriterConfig) -> Self {
        let policy = EscapePolicy {
            aggressive: config.escape_aggressive,
            unicode: true,
        };
        TagWriter {
            sink: XmlSink::new(writer),
            scope: ScopeStack::new(config.indent),
            config,
            state: TagState::Settled,
            prefixes: PrefixGenerator::new(),
            encoding: None,
            policy,
            attribute_prefixes: Vec::new(),
        }
    }

    /// Bind a new output, returning the previous one after flushing it
    ///
    /// A pending start tag is closed with `>` before the old output is released.
    /// All document state is reset, including the synthetic prefix counter.
    pub fn set_output(&mut self, writer: W, encoding: Option<&str>) -> Result<W> {
        debug!("binding new output, encoding {:?}", encoding);
        self.settle(false)?;
        let previous = std::mem::replace(&mut self.sink, XmlSink::new(writer));
        self.reset(encoding);
        previous.into_inner()
    }

    fn reset(&mut self, encoding: Option<&str>) {
        self.state = TagState::Settled;
        self.attribute_prefixes.clear();
        self.scope = ScopeStack::new(self.config.indent);
        self.prefixes = PrefixGenerator::new();
        self.set_encoding(encoding);
    }

    fn set_encoding(&mut self, encoding: Option<&str>) {
        self.encoding = encoding.map(str::to_string);
        self.policy.unicode = EscapePolicy::unicode_capable(encoding);
    }

    /// Flush and release the sink
    pub fn into_inner(mut self) -> Result<W> {
        self.settle(false)?;
        self.sink.into_inner()
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn state(&self) -> TagState {
        self.state
    }

    /// Nesting depth, counting a pending start tag
    pub fn depth(&self) -> usize {
        match self.state {
            TagState::Pending => self.scope.depth() + 1,
            TagState::Settled => self.scope.depth(),
        }
    }

    /// Local name of the innermost element
    pub fn current_name(&self) -> Option<&str> {
        self.scope.top().map(|frame| frame.name.as_str())
    }

    /// Namespace of the innermost element
    pub fn current_namespace(&self) -> Option<&str> {
        self.scope.top().and_then(|frame| frame.namespace.as_deref())
    }

    pub fn get_feature(&self, name: &str) -> Result<bool> {
        if name == FEATURE_INDENT_OUTPUT {
            Ok(self.scope.indent_here())
        } else {
            Err(XmlWriteError::UnsupportedFeature(name.to_string()))
        }
    }

    /// Toggle a feature for the current depth
    pub fn set_feature(&mut self, name: &str, value: bool) -> Result<()> {
        if name == FEATURE_INDENT_OUTPUT {
            self.scope.set_indent_here(value);
            Ok(())
        } else {
            Err(XmlWriteError::UnsupportedFeature(name.to_string()))
        }
    }

    /// No properties are supported
    pub fn get_property(&self, name: &str) -> Result<String> {
        Err(XmlWriteError::UnsupportedProperty(name.to_string()))
    }

    pub fn set_property(&mut self, name: &str, _value: &str) -> Result<()> {
        Err(XmlWriteError::UnsupportedProperty(name.to_string()))
    }

    /// Non-default prefix for `uri`, optionally binding a new one
    pub fn get_prefix(&mut self, uri: &str, create: bool) -> Option<String> {
        prefix::resolve(&mut self.scope, &mut self.prefixes, uri, false, create)
    }

    /// Bind `prefix` for the pending element, or the next one
    ///
    /// The declaration is written when that start tag settles.
    pub fn set_prefix(&mut self, prefix: &str, uri: Option<&str>) -> Result<()> {
        let uri = uri.unwrap_or("");
        if prefix::uri_for_prefix(&self.scope, prefix) == Some(uri) {
            return Ok(());
        }
        self.check_pending_element_prefix(prefix, uri)?;
        if self.scope.find_in_current(prefix).is_some() {
            return Err(conflicting_binding(prefix));
        }
        self.scope.declare(NamespaceBinding::new(prefix, uri, false));
        Ok(())
    }

    /// Write the XML declaration unless it is configured off
    pub fn start_document(&mut self, encoding: Option<&str>, standalone: Option<bool>) -> Result<()> {
        debug!("start document, encoding {:?}", encoding);
        if encoding.is_some() {
            self.set_encoding(encoding);
        }
        if self.config.omit_xml_declaration {
            return Ok(());
        }

        self.sink.write_str("<?xml version='1.0' ")?;
        if let Some(encoding) = &self.encoding {
            self.sink.write_str("encoding='")?;
            self.sink.write_str(encoding)?;
            self.sink.write_str("' ")?;
        }
        if let Some(standalone) = standalone {
            self.sink.write_str("standalone='")?;
            self.sink.write_str(if standalone { "yes" } else { "no" })?;
            self.sink.write_str("' ")?;
        }
        self.sink.write_str("?>")
    }

    pub fn doctype(&mut self, text: &str) -> Result<()> {
        self.settle(false)?;
        self.sink.write_str("<!DOCTYPE")?;
        self.sink.write_str(text)?;
        self.sink.write_str(">")
    }

    /// Open an element; it stays pending until the next event
    pub fn start_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<()> {
        self.settle(false)?;

        let namespace = non_empty(namespace);
        let prefix = match namespace {
            Some(uri) => {
                prefix::resolve(&mut self.scope, &mut self.prefixes, uri, true, true)
                    .unwrap_or_default()
            }
            None => {
                if let Some(default_uri) = prefix::uri_for_prefix(&self.scope, "") {
                    if !default_uri.is_empty() {
                        return Err(XmlWriteError::NamespaceConflict(format!(
                            "cannot use unprefixed element <{}> while default namespace {} is in scope",
                            name, default_uri
                        )));
                    }
                }
                String::new()
            }
        };

        if self.scope.indent_here() {
            self.write_indent(self.scope.depth())?;
        }

        self.sink.write_str("<")?;
        if !prefix.is_empty() {
            self.sink.write_str(&prefix)?;
            self.sink.write_str(":")?;
        }
        self.sink.write_str(name)?;

        self.scope.push_frame(ElementFrame::new(namespace, &prefix, name));
        self.state = TagState::Pending;
        Ok(())
    }

    /// Append an attribute to the pending start tag
    ///
    /// `xmlns` attributes are routed to [`namespace`](Self::namespace).
    pub fn attribute(&mut self, namespace: Option<&str>, name: &str, value: &str) -> Result<()> {
        if self.state != TagState::Pending {
            return Err(XmlWriteError::IllegalPosition("attribute"));
        }

        let namespace = namespace.unwrap_or("");
        if namespace == XMLNS_ATTRIBUTE_NS_URI {
            return self.namespace(name, Some(value));
        }
        if namespace.is_empty() && name == XMLNS_ATTRIBUTE {
            return self.namespace("", Some(value));
        }

        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            prefix::resolve(&mut self.scope, &mut self.prefixes, namespace, false, true)
                .unwrap_or_default()
        };
        if !prefix.is_empty() && !self.attribute_prefixes.iter().any(|(p, _)| *p == prefix) {
            self.attribute_prefixes
                .push((prefix.clone(), namespace.to_string()));
        }

        self.sink.write_str(" ")?;
        if !prefix.is_empty() {
            self.sink.write_str(&prefix)?;
            self.sink.write_str(":")?;
        }
        self.sink.write_str(name)?;
        self.write_quoted(value)
    }

    /// Declare `prefix` for `uri` on the pending start tag
    ///
    /// Repeating an identical declaration is a no-op; rebinding the prefix
    /// to another URI within the same element is a conflict.
    pub fn namespace(&mut self, prefix: &str, uri: Option<&str>) -> Result<()> {
        if self.state != TagState::Pending {
            return Err(XmlWriteError::IllegalPosition("namespace declaration"));
        }

        let uri = uri.unwrap_or("");
        self.check_pending_element_prefix(prefix, uri)?;

        match self.scope.find_in_current(prefix) {
            Some(index) => {
                let (same_uri, written) = match self.scope.binding(index) {
                    Some(binding) => (binding.uri == uri, binding.written),
                    None => (false, false),
                };
                if !same_uri {
                    return Err(conflicting_binding(prefix));
                }
                if written {
                    return Ok(());
                }
                self.scope.mark_written(index);
            }
            None => {
                self.scope.declare(NamespaceBinding::new(prefix, uri, true));
            }
        }

        self.write_xmlns(prefix, uri)
    }

    /// A declaration must not move the pending element, or an attribute
    /// already written on it, to another namespace
    fn check_pending_element_prefix(&self, prefix: &str, uri: &str) -> Result<()> {
        if self.state != TagState::Pending {
            return Ok(());
        }
        if let Some((_, used)) = self
            .attribute_prefixes
            .iter()
            .find(|(p, used)| p == prefix && used != uri)
        {
            return Err(XmlWriteError::NamespaceConflict(format!(
                "prefix '{}' is used by an attribute for {} and cannot be rebound to {:?}",
                prefix, used, uri
            )));
        }
        match self.scope.top() {
            Some(frame) if frame.prefix == prefix && frame.namespace.as_deref().unwrap_or("") != uri => {
                Err(XmlWriteError::NamespaceConflict(format!(
                    "prefix '{}' of element <{}> cannot be rebound to {:?}",
                    prefix,
                    frame.qualified_name(),
                    uri
                )))
            }
            _ => Ok(()),
        }
    }

    /// Escaped character data; disables indentation at this depth
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.settle(false)?;
        self.scope.set_indent_here(false);
        self.sink.write_str(&escape(text, Quote::None, self.policy))
    }

    pub fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        self.text(text)
    }

    /// Raw CDATA section
    pub fn cdata(&mut self, data: &str) -> Result<()> {
        self.settle(false)?;
        if data.contains("]]>") {
            warn!("CDATA content contains ']]>' and will terminate the section early");
        }
        self.sink.write_str("<![CDATA[")?;
        self.sink.write_str(data)?;
        self.sink.write_str("]]>")
    }

    pub fn comment(&mut self, comment: &str) -> Result<()> {
        self.settle(false)?;
        if comment.contains("--") {
            warn!("comment contains '--', output will not be well-formed");
        }
        self.sink.write_str("<!--")?;
        self.sink.write_str(comment)?;
        self.sink.write_str("-->")
    }

    /// Processing instruction; `pi` holds target and data
    pub fn processing_instruction(&mut self, pi: &str) -> Result<()> {
        self.settle(false)?;
        if pi.contains("?>") {
            warn!("processing instruction contains '?>' and will terminate early");
        }
        self.sink.write_str("<?")?;
        self.sink.write_str(pi)?;
        self.sink.write_str("?>")
    }

    pub fn entity_ref(&mut self, name: &str) -> Result<()> {
        self.settle(false)?;
        self.sink.write_str("&")?;
        self.sink.write_str(name)?;
        self.sink.write_str(";")
    }

    /// Close the innermost element
    ///
    /// A still-pending element is closed as `<name />`. A mismatch is
    /// reported before anything is written.
    pub fn end_tag(&mut self, namespace: Option<&str>, name: &str) -> Result<()> {
        let namespace = non_empty(namespace);

        if self.state == TagState::Pending {
            self.scope.expect_top(namespace, name)?;
            self.settle(true)?;
            self.scope.close(namespace, name)?;
            return Ok(());
        }

        let qualified = self.scope.expect_top(namespace, name)?.qualified_name();
        if self.scope.indent_here() {
            self.write_indent(self.scope.depth().saturating_sub(1))?;
        }
        self.sink.write_str("</")?;
        self.sink.write_str(&qualified)?;
        self.sink.write_str(">")?;
        self.scope.close(namespace, name)?;
        Ok(())
    }

    /// Close every open element and flush
    pub fn end_document(&mut self) -> Result<()> {
        while let Some(frame) = self.scope.top() {
            let namespace = frame.namespace.clone();
            let name = frame.name.clone();
            self.end_tag(namespace.as_deref(), &name)?;
        }
        debug!("end document");
        self.flush()
    }

    /// Settle any pending tag and flush the sink
    pub fn flush(&mut self) -> Result<()> {
        self.settle(false)?;
        self.sink.flush()
    }

    /// Dispatch one event to the matching method
    pub fn write_event(&mut self, event: XmlEvent<'_>) -> Result<()> {
        match event {
            XmlEvent::StartDocument {
                encoding,
                standalone,
            } => self.start_document(encoding, standalone),
            XmlEvent::DocType(text) => self.doctype(text),
            XmlEvent::StartTag { namespace, name } => self.start_tag(namespace, name),
            XmlEvent::Attribute {
                namespace,
                name,
                value,
            } => self.attribute(namespace, name, value),
            XmlEvent::Namespace { prefix, uri } => self.namespace(prefix, uri),
            XmlEvent::Text(text) => self.text(text),
            XmlEvent::IgnorableWhitespace(text) => self.ignorable_whitespace(text),
            XmlEvent::CData(data) => self.cdata(data),
            XmlEvent::Comment(comment) => self.comment(comment),
            XmlEvent::ProcessingInstruction(pi) => self.processing_instruction(pi),
            XmlEvent::EntityRef(name) => self.entity_ref(name),
            XmlEvent::EndTag { namespace, name } => self.end_tag(namespace, name),
            XmlEvent::EndDocument => self.end_document(),
            XmlEvent::Flush => self.flush(),
        }
    }

    /// Close a pending start tag with `>` or ` />`
    ///
    /// Declarations registered on the tag but not yet written go out first.
    fn settle(&mut self, self_close: bool) -> Result<()> {
        if self.state != TagState::Pending {
            return Ok(());
        }

        for index in self.scope.unwritten_in_current() {
            let (prefix, uri) = match self.scope.binding(index) {
                Some(binding) => (binding.prefix.clone(), binding.uri.clone()),
                None => continue,
            };
            self.write_xmlns(&prefix, &uri)?;
            self.scope.mark_written(index);
        }

        self.scope.open();
        self.state = TagState::Settled;
        self.attribute_prefixes.clear();
        trace!("settled start tag at depth {}", self.scope.depth());
        self.sink.write_str(if self_close { " />" } else { ">" })
    }

    fn write_xmlns(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.sink.write_str(" ")?;
        self.sink.write_str(XMLNS_ATTRIBUTE)?;
        if !prefix.is_empty() {
            self.sink.write_str(":")?;
            self.sink.write_str(prefix)?;
        }
        self.write_quoted(uri)
    }

    /// `="value"`, or single quotes when the value contains `"`
    fn write_quoted(&mut self, value: &str) -> Result<()> {
        let quote = Quote::for_value(value);
        let delimiter = if quote == Quote::Single { "'" } else { "\"" };
        self.sink.write_str("=")?;
        self.sink.write_str(delimiter)?;
        self.sink.write_str(&escape(value, quote, self.policy))?;
        self.sink.write_str(delimiter)
    }

    fn write_indent(&mut self, levels: usize) -> Result<()> {
        self.sink.write_str(self.config.line_ending.as_str())?;
        for _ in 0..levels {
            self.sink.write_str("  ")?;
        }
        Ok(())
    }
}

fn conflicting_binding(prefix: &str) -> XmlWriteError {
    XmlWriteError::NamespaceConflict(format!(
        "attempting to bind prefix '{}' to conflicting values in one element",
        prefix
    ))
}

/// Builder for configured tag writers
#[derive(Debug, Clone, Default)]
pub struct WriterBuilder {
    config: WriterConfig,
    encoding: Option<String>,
}

impl WriterBuilder {
    pub fn new() -> Self {
        WriterBuilder::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: WriterConfig) -> Self {
        WriterBuilder {
            config,
            encoding: None,
        }
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.config.indent = indent;
        self
    }

    pub fn with_omit_xml_declaration(mut self, omit: bool) -> Self {
        self.config.omit_xml_declaration = omit;
        self
    }

    pub fn with_escape_aggressive(mut self, aggressive: bool) -> Self {
        self.config.escape_aggressive = aggressive;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.config.line_ending = line_ending;
        self
    }

    /// Output encoding name; only affects the declaration and escaping
    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = Some(encoding.to_string());
        self
    }

    /// Build the writer
    pub fn build<W: Write>(self, writer: W) -> TagWriter<W> {
        let mut tag_writer = TagWriter::with_config(writer, self.config);
        tag_writer.set_encoding(self.encoding.as_deref());
        tag_writer
    }
}
