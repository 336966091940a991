//! Buffered byte sink with minimal allocations

use crate::error::Result;
use std::io::Write;

const FLUSH_THRESHOLD: usize = 4096;

/// Byte sink that batches small writes before handing them to `W`
pub struct XmlSink<W: Write> {
    writer: W,
    buffer: Vec<u8>,
}

impl<W: Write> XmlSink<W> {
    pub fn new(writer: W) -> Self {
        XmlSink {
            writer,
            buffer: Vec::with_capacity(8192), // 8KB buffer
        }
    }

    /// Write raw bytes directly
    #[inline]
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > FLUSH_THRESHOLD {
            self.drain()?;
        }
        Ok(())
    }

    /// Write string data
    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_raw(s.as_bytes())
    }

    /// Move buffered bytes to the underlying writer without flushing it
    fn drain(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flush buffer to underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.drain()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and release the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}
