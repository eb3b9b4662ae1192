//! # Lossless XML tree
//!
//! Parse XML into an arena of nodes, edit attribute values in place, and
//! write the document back without disturbing anything that was not edited.
//!
//! ```rust
//! use sigedit_xml::{parse, serialize};
//!
//! let mut tree = parse(r#"<rules><rule id="1" enabled="OFF"/></rules>"#).unwrap();
//! let root = tree.root_element().unwrap();
//! let rule = tree.find_descendant(root, "rule").unwrap();
//!
//! tree.set_attribute(rule, "enabled", "ON").unwrap();
//! assert_eq!(serialize(&tree), r#"<rules><rule id="1" enabled="ON"/></rules>"#);
//! ```

pub mod error;
pub mod parser;
pub mod serializer;
mod tokenizer;
pub mod tree;

pub use error::{ParseError, ParseResult, TreeError};
pub use parser::{parse, Parser};
pub use serializer::{serialize, Serializer};
pub use tree::{Attribute, Descendants, Element, Node, NodeId, NodeKind, Tree};
