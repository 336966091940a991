//! Character-level escaping for text content and attribute values

use std::borrow::Cow;

/// Quote context an escaped string is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// Plain character data
    None,
    /// Attribute value delimited by `"`
    Double,
    /// Attribute value delimited by `'`
    Single,
}

impl Quote {
    /// Delimiter for an attribute value: `"` unless the value contains one
    pub fn for_value(value: &str) -> Quote {
        if value.contains('"') {
            Quote::Single
        } else {
            Quote::Double
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Quote::None => None,
            Quote::Double => Some('"'),
            Quote::Single => Some('\''),
        }
    }
}

/// Escaping switches fixed for the lifetime of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapePolicy {
    /// Escape everything that might be mangled in transit
    pub aggressive: bool,
    /// Output encoding can represent every code point
    pub unicode: bool,
}

impl Default for EscapePolicy {
    fn default() -> Self {
        EscapePolicy {
            aggressive: false,
            unicode: true,
        }
    }
}

impl EscapePolicy {
    /// Encodings named `utf*` (any case) are Unicode-capable; no name means UTF-8
    pub fn unicode_capable(encoding: Option<&str>) -> bool {
        encoding.map_or(true, |name| {
            name.get(..3)
                .is_some_and(|head| head.eq_ignore_ascii_case("utf"))
        })
    }
}

enum Replacement {
    Named(&'static str),
    Numeric(u32),
}

#[inline]
fn replacement(c: char, quote: Quote, policy: EscapePolicy) -> Option<Replacement> {
    let in_attribute = quote != Quote::None;
    match c {
        '&' => Some(Replacement::Named("&amp;")),
        '>' => Some(Replacement::Named("&gt;")),
        '<' => Some(Replacement::Named("&lt;")),
        '"' | '\'' if quote.as_char() == Some(c) => Some(Replacement::Named(if c == '"' {
            "&quot;"
        } else {
            "&apos;"
        })),
        '"' | '\'' | '\n' | '\r' | '\t' => {
            (policy.aggressive && in_attribute).then_some(Replacement::Numeric(c as u32))
        }
        _ => {
            let unrepresentable = (c as u32) > 127 && !policy.unicode;
            (policy.aggressive && (c < ' ' || c == '@' || unrepresentable))
                .then_some(Replacement::Numeric(c as u32))
        }
    }
}

/// Escape `text` for the given quote context
///
/// Borrows the input when nothing needs replacing. Already escaped input is
/// escaped again: `&amp;` becomes `&amp;amp;`.
pub fn escape(text: &str, quote: Quote, policy: EscapePolicy) -> Cow<'_, str> {
    let first = match text
        .char_indices()
        .find(|&(_, c)| replacement(c, quote, policy).is_some())
    {
        Some((idx, _)) => idx,
        None => return Cow::Borrowed(text),
    };

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);
    let mut digits = itoa::Buffer::new();
    for c in text[first..].chars() {
        match replacement(c, quote, policy) {
            Some(Replacement::Named(entity)) => out.push_str(entity),
            Some(Replacement::Numeric(code)) => {
                out.push_str("&#");
                out.push_str(digits.format(code));
                out.push(';');
            }
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}
