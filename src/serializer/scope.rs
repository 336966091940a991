//! Element and namespace scope stacks
//!
//! All bindings live in one flat `Vec`, partitioned by `boundary`:
//! `boundary[d]` is the number of bindings visible to content at depth `d`.
//! Bindings at index `boundary[depth]..` belong to the element currently
//! pending (or to the next element, if nothing is pending). Closing an
//! element truncates its segment.

use crate::error::{display_name, Result, XmlWriteError};
use crate::types::{ElementFrame, NamespaceBinding, XMLNS_ATTRIBUTE, XMLNS_ATTRIBUTE_NS_URI, XML_NS_URI};
use log::trace;

/// Per-document nesting state
#[derive(Debug, Clone)]
pub struct ScopeStack {
    elements: Vec<ElementFrame>,
    bindings: Vec<NamespaceBinding>,
    boundary: Vec<usize>,
    indent: Vec<bool>,
}

impl ScopeStack {
    /// Fresh document state with the reserved bindings in place
    pub fn new(indent: bool) -> Self {
        let bindings = vec![
            NamespaceBinding::new("", "", true),
            NamespaceBinding::new("xml", XML_NS_URI, true),
            NamespaceBinding::new(XMLNS_ATTRIBUTE, XMLNS_ATTRIBUTE_NS_URI, true),
        ];
        let visible = bindings.len();
        ScopeStack {
            elements: Vec::with_capacity(12),
            bindings,
            boundary: vec![visible],
            indent: vec![indent],
        }
    }

    /// Number of completed (settled) start tags not yet closed
    #[inline]
    pub fn depth(&self) -> usize {
        self.boundary.len() - 1
    }

    /// Record the frame of a start tag that is about to become pending
    pub fn push_frame(&mut self, frame: ElementFrame) {
        self.elements.push(frame);
    }

    /// Innermost frame, pending or open
    pub fn top(&self) -> Option<&ElementFrame> {
        self.elements.last()
    }

    /// Fail with `StructuralMismatch` unless the innermost frame is `(namespace, name)`
    pub fn expect_top(&self, namespace: Option<&str>, name: &str) -> Result<&ElementFrame> {
        match self.elements.last() {
            Some(frame) if frame.matches(namespace, name) => Ok(frame),
            Some(frame) => Err(XmlWriteError::StructuralMismatch {
                expected: display_name(frame.namespace.as_deref(), &frame.name),
                found: display_name(namespace, name),
            }),
            None => Err(no_open_element(namespace, name)),
        }
    }

    /// Complete the pending start tag: one level deeper, inheriting the indent flag
    pub fn open(&mut self) {
        let inherited = self.indent_here();
        self.indent.push(inherited);
        self.boundary.push(self.bindings.len());
        trace!(
            "opened depth {} with {} visible bindings",
            self.depth(),
            self.bindings.len()
        );
    }

    /// Pop the innermost element after checking it is `(namespace, name)`
    ///
    /// Discards every binding declared on the closed element.
    pub fn close(&mut self, namespace: Option<&str>, name: &str) -> Result<ElementFrame> {
        self.expect_top(namespace, name)?;
        if self.depth() == 0 {
            return Err(no_open_element(namespace, name));
        }

        self.boundary.pop();
        self.indent.pop();
        let visible = self.visible_at_depth();
        self.bindings.truncate(visible);
        self.elements
            .pop()
            .ok_or_else(|| no_open_element(namespace, name))
    }

    #[inline]
    fn visible_at_depth(&self) -> usize {
        self.boundary.last().copied().unwrap_or(0)
    }

    /// Every binding visible at this point, oldest first
    #[inline]
    pub fn bindings(&self) -> &[NamespaceBinding] {
        &self.bindings
    }

    /// Bindings declared for the pending (or next) element
    #[inline]
    pub fn current_segment(&self) -> &[NamespaceBinding] {
        &self.bindings[self.visible_at_depth()..]
    }

    /// Position of `prefix` inside the current segment, as an absolute index
    pub fn find_in_current(&self, prefix: &str) -> Option<usize> {
        let start = self.visible_at_depth();
        self.current_segment()
            .iter()
            .position(|b| b.prefix == prefix)
            .map(|offset| start + offset)
    }

    /// Add a binding to the current segment
    pub fn declare(&mut self, binding: NamespaceBinding) -> usize {
        self.bindings.push(binding);
        self.bindings.len() - 1
    }

    pub fn binding(&self, index: usize) -> Option<&NamespaceBinding> {
        self.bindings.get(index)
    }

    pub fn mark_written(&mut self, index: usize) {
        if let Some(binding) = self.bindings.get_mut(index) {
            binding.written = true;
        }
    }

    /// Indices of current-segment bindings whose `xmlns` is still unwritten
    pub fn unwritten_in_current(&self) -> Vec<usize> {
        let start = self.visible_at_depth();
        self.current_segment()
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.written)
            .map(|(offset, _)| start + offset)
            .collect()
    }

    /// Indent flag for content at the current depth
    #[inline]
    pub fn indent_here(&self) -> bool {
        self.indent.last().copied().unwrap_or(false)
    }

    pub fn set_indent_here(&mut self, value: bool) {
        if let Some(flag) = self.indent.last_mut() {
            *flag = value;
        }
    }
}

fn no_open_element(namespace: Option<&str>, name: &str) -> XmlWriteError {
    XmlWriteError::StructuralMismatch {
        expected: "<no open element>".to_string(),
        found: display_name(namespace, name),
    }
}
