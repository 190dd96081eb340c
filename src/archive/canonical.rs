//! Markup canonicalization used as the slow path of member comparison.

use std::io::Cursor;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Failure to canonicalize a member's text.
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    #[error("malformed markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("element name is not UTF-8: {0}")]
    Name(#[from] std::str::Utf8Error),

    #[error("canonical output is not UTF-8: {0}")]
    Output(#[from] std::string::FromUtf8Error),
}

/// Re-serializes markup so that cosmetic differences disappear.
///
/// Two texts are considered equivalent when their canonical forms are equal.
pub trait Canonicalizer {
    fn canonicalize(&self, text: &str) -> Result<String, CanonicalizeError>;
}

impl<C: Canonicalizer + ?Sized> Canonicalizer for &C {
    fn canonicalize(&self, text: &str) -> Result<String, CanonicalizeError> {
        (**self).canonicalize(text)
    }
}

/// Pretty-printer for XML parts: sorts attributes, drops whitespace-only
/// text and comments, and re-indents. Whitespace inside text is kept.
#[derive(Debug, Clone, Copy)]
pub struct XmlCanonicalizer {
    indent: usize,
}

impl XmlCanonicalizer {
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }
}

impl Default for XmlCanonicalizer {
    fn default() -> Self {
        Self::with_indent(2)
    }
}

impl Canonicalizer for XmlCanonicalizer {
    fn canonicalize(&self, text: &str) -> Result<String, CanonicalizeError> {
        let mut reader = Reader::from_str(text);
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', self.indent);

        loop {
            match reader.read_event()? {
                Event::Eof => break,
                Event::Start(start) => {
                    writer.write_event(Event::Start(sorted_attributes(&start)?))?;
                }
                Event::Empty(start) => {
                    writer.write_event(Event::Empty(sorted_attributes(&start)?))?;
                }
                Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
                Event::Comment(_) => {}
                event => writer.write_event(event)?,
            }
        }

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}

fn sorted_attributes(start: &BytesStart<'_>) -> Result<BytesStart<'static>, CanonicalizeError> {
    let mut attributes = start.attributes().collect::<Result<Vec<_>, _>>()?;
    attributes.sort_by(|a, b| a.key.as_ref().cmp(b.key.as_ref()));

    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut sorted = BytesStart::new(name);
    for attribute in attributes {
        sorted.push_attribute(attribute);
    }
    Ok(sorted)
}
