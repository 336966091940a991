//! Streaming serializer internals
//!
//! This module layers the writer as:
//! - Scope stacks for open elements and namespace bindings
//! - Prefix resolution with synthetic prefix generation
//! - Deferred start-tag emission
//! - Character escaping

pub mod escape;
pub mod prefix;
pub mod scope;
pub mod sink;
pub mod writer;

use crate::config::WriterConfig;
use std::io::Write;

pub use escape::{escape, EscapePolicy, Quote};
pub use writer::{TagState, TagWriter, WriterBuilder};

/// Create a tag writer configured from the `XML_WRITER_*` environment variables
///
/// # Examples
///
/// ```
/// use xmlstream_writer::serializer::create_writer_from_env;
///
/// let mut writer = create_writer_from_env(Vec::new());
/// writer.start_tag(None, "root")?;
/// writer.end_document()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn create_writer_from_env<W: Write>(writer: W) -> TagWriter<W> {
    TagWriter::with_config(writer, WriterConfig::from_env())
}
