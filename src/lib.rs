//! # xmlstream-writer
//!
//! A streaming, namespace-aware XML serializer.
//!
//! ## Features
//!
//! - **Streaming Write**: Events go straight to the output, no document tree is built
//! - **Namespace Aware**: Prefixes are reused from enclosing scopes and generated when missing
//! - **Self-closing Tags**: Elements without content are written as `<name />`
//! - **Shadowing Safe**: A prefix never refers to two namespaces at one point
//! - **Better Errors**: Mismatched tags and conflicting bindings are reported, never repaired
//!
//! ## Quick Start
//!
//! ```rust
//! use xmlstream_writer::TagWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = TagWriter::new(Vec::new());
//!
//! writer.start_document(Some("UTF-8"), None)?;
//! writer.set_prefix("b", Some("urn:books"))?;
//! writer.start_tag(Some("urn:books"), "library")?;
//! writer.start_tag(Some("urn:books"), "book")?;
//! writer.attribute(None, "title", "Dune")?;
//! writer.end_tag(Some("urn:books"), "book")?;
//! writer.end_document()?;
//!
//! let xml = String::from_utf8(writer.into_inner()?)?;
//! assert!(xml.ends_with(r#"<b:book title="Dune" /></b:library>"#));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod serializer;
pub mod types;

pub use config::{LineEnding, WriterConfig};
pub use error::{Result, XmlWriteError};
pub use event::XmlEvent;
pub use serializer::{TagState, TagWriter, WriterBuilder};
