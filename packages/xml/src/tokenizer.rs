//! Start-tag scanner.
//!
//! quick-xml hands back attribute keys and values but not the whitespace
//! between them. To write an edited tag back without disturbing its
//! layout, the raw `<name a = "1"  b='2' >` markup is split here into
//! pieces that concatenate back to the original text.

use crate::error::{ParseError, ParseResult};
use crate::tree::{Attribute, Element};

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }
}

/// Split the markup of one start tag into an [`Element`].
///
/// `offset` is the byte position of the tag in the whole document and is
/// only used for error reporting.
pub(crate) fn scan_start_tag(markup: &str, self_closing: bool, offset: usize) -> ParseResult<Element> {
    let close = if self_closing { "/>" } else { ">" };
    let inner = markup
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix(close))
        .ok_or_else(|| ParseError::malformed_tag(offset, "tag is not delimited by '<' and '>'"))?;

    let mut cursor = Cursor::new(inner);
    let name = cursor.take_while(|c| !is_xml_space(c));
    if name.is_empty() {
        return Err(ParseError::malformed_tag(offset, "missing element name"));
    }

    let mut attributes = Vec::new();
    let tag_tail = loop {
        let leading = cursor.take_while(is_xml_space);
        if cursor.is_done() {
            break leading;
        }
        if leading.is_empty() {
            return Err(ParseError::malformed_tag(
                offset + 1 + cursor.pos,
                "expected whitespace before attribute",
            ));
        }

        let attr_name = cursor.take_while(|c| !is_xml_space(c) && c != '=');
        if attr_name.is_empty() {
            return Err(ParseError::malformed_tag(offset + 1 + cursor.pos, "missing attribute name"));
        }

        let separator_start = cursor.pos;
        cursor.take_while(is_xml_space);
        if cursor.bump() != Some('=') {
            return Err(ParseError::malformed_tag(
                offset + 1 + cursor.pos,
                format!("attribute '{attr_name}' has no value"),
            ));
        }
        cursor.take_while(is_xml_space);
        let separator = &inner[separator_start..cursor.pos];

        let quote = match cursor.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(ParseError::malformed_tag(
                    offset + 1 + cursor.pos,
                    format!("value of '{attr_name}' is not quoted"),
                ))
            }
        };
        let raw_value = cursor.take_while(|c| c != quote);
        if cursor.bump() != Some(quote) {
            return Err(ParseError::malformed_tag(
                offset + 1 + cursor.pos,
                format!("value of '{attr_name}' is not terminated"),
            ));
        }

        attributes.push(Attribute {
            leading: leading.to_string(),
            name: attr_name.to_string(),
            separator: separator.to_string(),
            quote,
            raw_value: raw_value.to_string(),
        });
    };

    Ok(Element {
        name: name.to_string(),
        attributes,
        tag_tail: tag_tail.to_string(),
        self_closing,
        end_tag: String::new(),
    })
}
