//! # Document Tree
//!
//! Arena-backed XML tree. Every node lives in one `Vec` owned by the
//! [`Tree`] and is addressed by a [`NodeId`], so callers can keep plain
//! indices into the document instead of references.
//!
//! Nothing the parser sees is thrown away: text keeps its escaped form,
//! comments and declarations keep their exact markup, and attributes
//! remember their quoting and the whitespace around them. Serializing an
//! untouched tree reproduces the source byte for byte.

use std::borrow::Cow;
use std::fmt;

use quick_xml::escape::{escape, unescape};

use crate::error::TreeError;

/// Stable index of a node inside its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The synthetic document node at index 0
    Document,
    Element(Element),
    /// Character data, still escaped (`a &amp; b`)
    Text(String),
    /// Full markup including `<![CDATA[` and `]]>`
    CData(String),
    /// Full markup including `<!--` and `-->`
    Comment(String),
    /// `<?xml ... ?>`
    Declaration(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|e| e.name == name)
    }
}

/// An element with its start tag split into editable pieces
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Vec<Attribute>,
    /// Whitespace between the last attribute and `>` / `/>`
    pub(crate) tag_tail: String,
    pub(crate) self_closing: bool,
    /// Raw end tag markup; empty for self-closing elements
    pub(crate) end_tag: String,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Unescaped value of the first attribute called `name`
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(Attribute::value)
    }

    /// Replace an attribute value in place, or append a new attribute.
    ///
    /// Position, quote character and surrounding whitespace of an existing
    /// attribute are kept; only the value bytes change.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attribute) => attribute.set_value(value),
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub(crate) fn write_start_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attribute in &self.attributes {
            attribute.write(out);
        }
        out.push_str(&self.tag_tail);
        out.push_str(if self.self_closing { "/>" } else { ">" });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub(crate) leading: String,
    pub(crate) name: String,
    /// `=` together with any whitespace around it
    pub(crate) separator: String,
    pub(crate) quote: char,
    pub(crate) raw_value: String,
}

impl Attribute {
    pub(crate) fn new(name: &str, value: &str) -> Self {
        Self {
            leading: " ".to_string(),
            name: name.to_string(),
            separator: "=".to_string(),
            quote: '"',
            raw_value: escape(value).into_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value as written in the source, entities unresolved
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Value with entities resolved. Unknown entities are left as written.
    pub fn value(&self) -> Cow<'_, str> {
        unescape(&self.raw_value).unwrap_or(Cow::Borrowed(self.raw_value.as_str()))
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.raw_value = escape(value).into_owned();
    }

    fn write(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.name);
        out.push_str(&self.separator);
        out.push(self.quote);
        out.push_str(&self.raw_value);
        out.push(self.quote);
    }
}

/// Owner of every node of one parsed document
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node, parent of the prolog and the root element
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub(crate) fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append character data, merging with a directly preceding text node.
    ///
    /// quick-xml reports entity references as separate events; merging keeps
    /// one text node per run of character data.
    pub(crate) fn append_text(&mut self, parent: NodeId, raw: &str) -> NodeId {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeKind::Text(text) = &mut self.nodes[last.0].kind {
                text.push_str(raw);
                return last;
            }
        }
        self.append(parent, NodeKind::Text(raw.to_string()))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::InvalidNode(id.0))
    }

    pub fn element(&self, id: NodeId) -> Result<&Element, TreeError> {
        self.node(id)?
            .as_element()
            .ok_or(TreeError::NotAnElement(id.0))
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, TreeError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(TreeError::InvalidNode(id.0))?;
        match &mut node.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(TreeError::NotAnElement(id.0)),
        }
    }

    /// First element child of the document node
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document())
            .iter()
            .copied()
            .find(|&id| self.nodes[id.0].as_element().is_some())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// All nodes below `id` in document order, `id` itself excluded
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    pub fn descendants_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(id)
            .filter(move |&child| self.nodes[child.0].is_element_named(name))
    }

    pub fn find_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants_named(id, name).next()
    }

    /// Concatenated, unescaped character data of every descendant
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for child in self.descendants(id) {
            match &self.nodes[child.0].kind {
                NodeKind::Text(raw) => {
                    text.push_str(&unescape(raw).unwrap_or(Cow::Borrowed(raw.as_str())));
                }
                NodeKind::CData(raw) => {
                    let inner = raw
                        .strip_prefix("<![CDATA[")
                        .and_then(|s| s.strip_suffix("]]>"))
                        .unwrap_or(raw.as_str());
                    text.push_str(inner);
                }
                _ => {}
            }
        }
        text
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<Cow<'_, str>> {
        self.element(id).ok()?.attribute(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }
}

/// Pre-order walk over a subtree
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_descendants_in_document_order() {
        let tree = parse("<a><b><c/></b><d/></a>").unwrap();
        let root = tree.root_element().unwrap();

        let names: Vec<&str> = tree
            .descendants(root)
            .filter_map(|id| tree.element(id).ok())
            .map(Element::name)
            .collect();

        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_attribute_is_unescaped() {
        let tree = parse(r#"<a title="x &amp; y &lt;z&gt;"/>"#).unwrap();
        let root = tree.root_element().unwrap();

        assert_eq!(tree.attribute(root, "title").unwrap(), "x & y <z>");
        assert!(tree.attribute(root, "missing").is_none());
    }

    #[test]
    fn test_set_attribute_appends_when_missing() {
        let mut tree = parse("<a x='1'/>").unwrap();
        let root = tree.root_element().unwrap();

        tree.set_attribute(root, "y", "2").unwrap();

        let element = tree.element(root).unwrap();
        assert_eq!(element.attributes().len(), 2);
        assert_eq!(element.attribute("y").unwrap(), "2");
    }

    #[test]
    fn test_set_attribute_escapes_value() {
        let mut tree = parse(r#"<a x="1"/>"#).unwrap();
        let root = tree.root_element().unwrap();

        tree.set_attribute(root, "x", r#"a"b<c"#).unwrap();

        let element = tree.element(root).unwrap();
        assert_eq!(element.attributes()[0].raw_value(), "a&quot;b&lt;c");
        assert_eq!(element.attribute("x").unwrap(), r#"a"b<c"#);
    }

    #[test]
    fn test_text_content_joins_text_and_cdata() {
        let tree = parse("<a>one &amp; <b>two</b><![CDATA[<three>]]></a>").unwrap();
        let root = tree.root_element().unwrap();

        assert_eq!(tree.text_content(root), "one & two<three>");
    }

    #[test]
    fn test_element_access_on_non_element() {
        let mut tree = parse("<a>text</a>").unwrap();
        let root = tree.root_element().unwrap();
        let text = tree.children(root)[0];

        assert_eq!(tree.element(text), Err(TreeError::NotAnElement(text.index())));
        assert!(tree.set_attribute(text, "x", "1").is_err());
        assert_eq!(
            tree.element(NodeId(999)),
            Err(TreeError::InvalidNode(999))
        );
    }
}
