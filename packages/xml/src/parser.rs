use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, ParseResult};
use crate::tokenizer::scan_start_tag;
use crate::tree::{NodeId, NodeKind, Tree};

/// Parse XML text into a lossless [`Tree`].
///
/// quick-xml drives well-formedness checking (matching end tags, attribute
/// syntax, duplicate attributes). Each node is built from the exact source
/// slice of its event, so nothing outside the edited values is ever
/// re-rendered.
pub fn parse(source: &str) -> ParseResult<Tree> {
    Parser::new(source).parse()
}

const BOM: char = '\u{feff}';

pub struct Parser<'a> {
    source: &'a str,
    /// Bytes of a leading byte-order mark kept out of the reader.
    base: usize,
    reader: Reader<&'a [u8]>,
    tree: Tree,
    open: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        // quick-xml skips a BOM without counting it in `buffer_position`,
        // which would shift every slice. Keep it as leading document text.
        let body = source.strip_prefix(BOM).unwrap_or(source);
        let base = source.len() - body.len();

        let mut tree = Tree::new();
        if base > 0 {
            let document = tree.document();
            tree.append_text(document, &source[..base]);
        }
        let open = vec![tree.document()];
        Self {
            source: body,
            base,
            reader: Reader::from_str(body),
            tree,
            open,
        }
    }

    pub fn parse(mut self) -> ParseResult<Tree> {
        let source = self.source;
        loop {
            let start = self.reader.buffer_position() as usize;
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    let pos = self.reader.error_position() as usize + self.base;
                    return Err(ParseError::xml(pos, e.to_string()));
                }
            };
            let end = self.reader.buffer_position() as usize;
            let offset = start + self.base;
            let markup = source.get(start..end).ok_or_else(|| {
                ParseError::xml(offset, "event boundary is not on a character boundary")
            })?;

            match event {
                Event::Start(tag) => {
                    let id = self.push_element(&tag, markup, false, offset)?;
                    self.open.push(id);
                }
                Event::Empty(tag) => {
                    self.push_element(&tag, markup, true, offset)?;
                }
                Event::End(_) => self.close_element(markup, offset)?,
                Event::Text(_) | Event::GeneralRef(_) => {
                    let parent = self.current();
                    self.tree.append_text(parent, markup);
                }
                Event::CData(_) => self.push_leaf(NodeKind::CData(markup.to_string())),
                Event::Comment(_) => self.push_leaf(NodeKind::Comment(markup.to_string())),
                Event::Decl(_) => self.push_leaf(NodeKind::Declaration(markup.to_string())),
                Event::PI(_) => {
                    self.push_leaf(NodeKind::ProcessingInstruction(markup.to_string()))
                }
                Event::DocType(_) => self.push_leaf(NodeKind::DocType(markup.to_string())),
                Event::Eof => break,
            }
        }

        if self.open.len() > 1 {
            let name = self
                .open
                .last()
                .and_then(|&id| self.tree.element(id).ok())
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            return Err(ParseError::UnclosedElement { name });
        }
        if self.tree.root_element().is_none() {
            return Err(ParseError::NoRootElement);
        }

        Ok(self.tree)
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.tree.document())
    }

    fn push_leaf(&mut self, kind: NodeKind) {
        let parent = self.current();
        self.tree.append(parent, kind);
    }

    fn push_element(
        &mut self,
        tag: &BytesStart<'_>,
        markup: &str,
        self_closing: bool,
        offset: usize,
    ) -> ParseResult<NodeId> {
        // Let quick-xml reject duplicate or syntactically broken attributes
        // before the layout-preserving scan runs.
        for attribute in tag.attributes() {
            attribute.map_err(|e| ParseError::malformed_tag(offset, e.to_string()))?;
        }

        let element = scan_start_tag(markup, self_closing, offset)?;
        let parent = self.current();
        Ok(self.tree.append(parent, NodeKind::Element(element)))
    }

    fn close_element(&mut self, markup: &str, offset: usize) -> ParseResult<()> {
        if self.open.len() <= 1 {
            return Err(ParseError::xml(offset, "end tag without matching start tag"));
        }
        let id = self.current();
        self.open.pop();
        let element = self
            .tree
            .element_mut(id)
            .map_err(|e| ParseError::xml(offset, e.to_string()))?;
        element.end_tag = markup.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_tree() {
        let tree = parse(r#"<?xml version="1.0"?><root a="1"><child>text</child></root>"#).unwrap();

        let root = tree.root_element().unwrap();
        assert_eq!(tree.element(root).unwrap().name(), "root");
        assert_eq!(tree.children(tree.document()).len(), 2);

        let child = tree.find_descendant(root, "child").unwrap();
        assert_eq!(tree.text_content(child), "text");
        assert_eq!(tree.parent(child), Some(root));
    }

    #[test]
    fn test_entity_references_stay_in_one_text_node() {
        let tree = parse("<a>x &amp; y &#65; z</a>").unwrap();
        let root = tree.root_element().unwrap();

        assert_eq!(tree.children(root).len(), 1);
        assert_eq!(tree.text_content(root), "x & y A z");
    }

    #[test]
    fn test_mismatched_end_tag_is_rejected() {
        let err = parse("<a><b></a></b>").unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }));
    }

    #[test]
    fn test_unclosed_element_is_rejected() {
        assert!(parse("<a><b></b>").is_err());
    }

    #[test]
    fn test_duplicate_attribute_is_rejected() {
        let err = parse(r#"<a x="1" x="2"/>"#).unwrap_err();
        assert!(matches!(err, ParseError::MalformedTag { .. }));
    }

    #[test]
    fn test_leading_bom_is_kept_as_document_text() {
        let source = "\u{feff}<?xml version=\"1.0\"?>\n<root a=\"1\"><b/></root>";
        let tree = parse(source).unwrap();

        let root = tree.root_element().unwrap();
        assert_eq!(tree.element(root).unwrap().name(), "root");
        assert_eq!(tree.attribute(root, "a").as_deref(), Some("1"));
        assert!(matches!(
            tree.get(tree.children(tree.document())[0]).map(|n| n.kind()),
            Some(NodeKind::Text(text)) if text == "\u{feff}"
        ));
    }

    #[test]
    fn test_error_positions_count_the_bom() {
        let err = parse("\u{feff}<a></b>").unwrap_err();
        assert!(matches!(err, ParseError::Xml { pos, .. } if pos >= 3));
    }

    #[test]
    fn test_document_without_element_is_rejected() {
        assert_eq!(parse("<!-- nothing -->").unwrap_err(), ParseError::NoRootElement);
        assert_eq!(parse("").unwrap_err(), ParseError::NoRootElement);
    }
}
