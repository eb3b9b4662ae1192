//! # Sigedit Editor
//!
//! Editing engine for signatures files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ sigedit-xml: text → lossless Tree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: SignaturesDocument + mutations      │
//! │  - Project <SignatureRule> elements to rows │
//! │  - Write edits through to the tree          │
//! │  - Serialize the whole tree back out        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: filter → page → selection          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: rows are a derived view
//! 2. **Unedited bytes stay put**: only changed attribute values are re-rendered
//! 3. **Handles are checked**: a row handle never reaches a different document
//!
//! ## Usage
//!
//! ```rust
//! use sigedit_editor::{Action, EditSession, Mutation};
//!
//! let mut session = EditSession::new();
//! session.load(r#"<SignaturesFile><SignatureRule id="1" actions="log"/></SignaturesFile>"#)?;
//!
//! session.toggle_selected("1");
//! session.apply_to_selection(&Mutation::SetAction { action: Action::Block, present: true })?;
//!
//! let xml = session.export()?;
//! assert!(xml.contains(r#"actions="log,block""#));
//! # Ok::<(), sigedit_editor::EditorError>(())
//! ```

mod document;
mod errors;
mod filter;
mod mutations;
mod pagination;
mod rule;
mod selection;
mod session;

pub use document::{SignaturesDocument, LOG_STRING_ELEMENT, ROOT_ELEMENT, RULE_ELEMENT};
pub use errors::EditorError;
pub use filter::{Facets, RuleFilter};
pub use mutations::{Mutation, MutationResult};
pub use pagination::{PageInfo, PageSize, Pager, DEFAULT_PAGE_SIZE, PAGE_SIZE_CHOICES};
pub use rule::{Action, ActionSet, Enabled, NodeRef, RowRef, RuleField, RuleRow};
pub use selection::Selection;
pub use session::{EditSession, SessionStatus, EXPORT_FILE_NAME};
