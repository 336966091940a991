//! Writer configuration and environment overrides

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Line terminator written before indented tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n` (default)
    #[default]
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lf" | "\\n" => Some(LineEnding::Lf),
            "crlf" | "\\r\\n" => Some(LineEnding::CrLf),
            _ => None,
        }
    }
}

/// Fixed settings for one writer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WriterConfig {
    /// Skip the `<?xml ...?>` declaration in `start_document`
    pub omit_xml_declaration: bool,
    /// Escape quotes, whitespace controls, `@` and (for non-Unicode
    /// encodings) non-ASCII characters as numeric character references
    pub escape_aggressive: bool,
    /// Initial indent-output flag for the document root
    pub indent: bool,
    /// Terminator used by indentation
    pub line_ending: LineEnding,
}

impl WriterConfig {
    /// Read overrides from environment variables
    ///
    /// - `XML_WRITER_INDENT`
    /// - `XML_WRITER_OMIT_DECLARATION`
    /// - `XML_WRITER_ESCAPE_AGGRESSIVE`
    /// - `XML_WRITER_LINE_ENDING` (`lf` or `crlf`)
    ///
    /// Missing or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).and_then(|v| parse_flag(&v));
        let defaults = WriterConfig::default();

        WriterConfig {
            omit_xml_declaration: flag("XML_WRITER_OMIT_DECLARATION")
                .unwrap_or(defaults.omit_xml_declaration),
            escape_aggressive: flag("XML_WRITER_ESCAPE_AGGRESSIVE")
                .unwrap_or(defaults.escape_aggressive),
            indent: flag("XML_WRITER_INDENT").unwrap_or(defaults.indent),
            line_ending: lookup("XML_WRITER_LINE_ENDING")
                .and_then(|v| LineEnding::parse(&v))
                .unwrap_or(defaults.line_ending),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
