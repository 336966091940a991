//! Error types for the streaming XML writer

use thiserror::Error;

/// Result type alias for xml writer operations
pub type Result<T> = std::result::Result<T, XmlWriteError>;

/// Main error type for all serializer operations
///
/// Every error is fatal to the document being written. The writer does not
/// resynchronize, so callers should drop it after any error.
#[derive(Error, Debug)]
pub enum XmlWriteError {
    /// End tag does not match the innermost open element
    #[error("End tag {found} does not match start tag {expected}")]
    StructuralMismatch { expected: String, found: String },

    /// Attribute or namespace declaration outside of a start tag
    #[error("Illegal position for {0}: no start tag is pending")]
    IllegalPosition(&'static str),

    /// A prefix bound to two namespaces at one point in the document
    #[error("Namespace conflict: {0}")]
    NamespaceConflict(String),

    /// Unknown feature name
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Unknown property name
    #[error("Unsupported property: {0}")]
    UnsupportedProperty(String),

    /// Underlying sink failed on write or flush
    #[error("Sink failure: {0}")]
    SinkFailure(#[from] std::io::Error),
}

/// Render an optional namespace plus local name as `{uri}name`
pub(crate) fn display_name(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{{{}}}{}", ns, name),
        None => name.to_string(),
    }
}
