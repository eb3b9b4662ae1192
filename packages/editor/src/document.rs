//! # Signatures Document
//!
//! A parsed signatures file: the lossless XML tree plus one [`RuleRow`] per
//! `<SignatureRule>` element, in document order.
//!
//! ## Lifecycle
//!
//! ```text
//! parse → rows → apply_batch → to_xml
//!   ↓       ↓         ↓           ↓
//! Tree   RuleRow   attribute    exact source,
//!                  write-through edited values only
//! ```
//!
//! Every parse gets a fresh generation number. Row handles carry it, so a
//! handle kept across a reload is detected and refused.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use sigedit_xml::{NodeId, Tree};
use tracing::{debug, trace};

use crate::mutations::{Mutation, MutationResult};
use crate::rule::{RowRef, RuleField, RuleRow};
use crate::EditorError;

pub const ROOT_ELEMENT: &str = "SignaturesFile";
pub const RULE_ELEMENT: &str = "SignatureRule";
pub const LOG_STRING_ELEMENT: &str = "LogString";

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct SignaturesDocument {
    generation: u64,

    /// Increments on every batch that wrote at least one attribute
    revision: u64,

    tree: Tree,
    root: NodeId,
    schema_version: String,
    version: String,
    rows: Vec<RuleRow>,
}

impl SignaturesDocument {
    /// Parse signatures XML and project its rules.
    ///
    /// The document element must be `<SignaturesFile>`. A file without any
    /// rules is valid and yields zero rows.
    pub fn parse(source: &str) -> Result<Self, EditorError> {
        let tree = sigedit_xml::parse(source)?;
        let root = tree
            .root_element()
            .ok_or(sigedit_xml::ParseError::NoRootElement)?;
        let root_name = tree
            .element(root)
            .map(|element| element.name().to_string())
            .unwrap_or_default();
        if root_name != ROOT_ELEMENT {
            return Err(EditorError::UnrecognizedDocument { found: root_name });
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let rows: Vec<RuleRow> = tree
            .descendants_named(root, RULE_ELEMENT)
            .enumerate()
            .map(|(index, node)| RuleRow::project(&tree, node, RowRef { generation, index }))
            .collect();

        let header = |name: &str| {
            tree.attribute(root, name)
                .map(|value| value.into_owned())
                .unwrap_or_default()
        };
        let schema_version = header("schema_version");
        let version = header("version");

        debug!(
            generation,
            rules = rows.len(),
            schema_version = %schema_version,
            "parsed signatures document"
        );

        Ok(Self {
            generation,
            revision: 0,
            tree,
            root,
            schema_version,
            version,
            rows,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.revision > 0
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn rows(&self) -> &[RuleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: RowRef) -> Result<&RuleRow, EditorError> {
        self.resolve(row)?;
        Ok(&self.rows[row.index])
    }

    pub fn row_refs(&self) -> impl Iterator<Item = RowRef> + '_ {
        self.rows.iter().map(RuleRow::handle)
    }

    /// First row with the given id
    pub fn find(&self, id: &str) -> Option<RowRef> {
        self.rows.iter().find(|row| row.id() == id).map(RuleRow::handle)
    }

    /// Every row with the given id, in document order
    pub fn row_refs_by_id(&self, id: &str) -> Vec<RowRef> {
        self.rows
            .iter()
            .filter(|row| row.id() == id)
            .map(RuleRow::handle)
            .collect()
    }

    /// Rows whose id is in `ids`, in document order
    pub fn refs_for_ids<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<RowRef> {
        let ids: HashSet<&str> = ids.into_iter().collect();
        self.rows
            .iter()
            .filter(|row| ids.contains(row.id()))
            .map(RuleRow::handle)
            .collect()
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<&str> {
        self.distinct(RuleField::Category)
    }

    /// Distinct non-empty severities, sorted
    pub fn severities(&self) -> Vec<&str> {
        self.distinct(RuleField::Severity)
    }

    fn distinct(&self, field: RuleField) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(field))
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Write one attribute on the element behind `row` and on the row itself
    pub fn set_attribute(
        &mut self,
        row: RowRef,
        field: RuleField,
        value: &str,
    ) -> Result<MutationResult, EditorError> {
        self.apply_batch_with(&[row], |_| vec![(field, value.to_string())])
    }

    pub fn apply(&mut self, row: RowRef, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        self.apply_batch(&[row], mutation)
    }

    pub fn apply_batch(
        &mut self,
        rows: &[RowRef],
        mutation: &Mutation,
    ) -> Result<MutationResult, EditorError> {
        self.apply_batch_with(rows, |row| mutation.changes(row))
    }

    /// Apply per-row writes computed by `transform`.
    ///
    /// Every handle is checked before anything is written, so a batch that
    /// contains a detached handle changes nothing. Repeated handles are
    /// applied once. Writes equal to the current value are skipped.
    pub fn apply_batch_with<F>(
        &mut self,
        rows: &[RowRef],
        mut transform: F,
    ) -> Result<MutationResult, EditorError>
    where
        F: FnMut(&RuleRow) -> Vec<(RuleField, String)>,
    {
        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(rows.len());
        for &row in rows {
            let node = self.resolve(row)?;
            if seen.insert(row.index) {
                targets.push((row.index, node));
            }
        }

        let mut rows_changed = 0;
        for (index, node) in targets {
            let changes: Vec<_> = transform(&self.rows[index])
                .into_iter()
                .filter(|(field, value)| self.rows[index].get(*field) != value.as_str())
                .collect();
            if changes.is_empty() {
                continue;
            }
            for (field, value) in changes {
                self.write_through(index, node, field, value)?;
            }
            rows_changed += 1;
        }

        if rows_changed > 0 {
            self.revision += 1;
        }
        debug!(
            requested = rows.len(),
            rows_changed,
            revision = self.revision,
            "applied batch"
        );

        Ok(MutationResult {
            revision: self.revision,
            rows_changed,
        })
    }

    /// Serialize the current tree, including every applied edit
    pub fn to_xml(&self) -> String {
        sigedit_xml::serialize(&self.tree)
    }

    fn resolve(&self, row: RowRef) -> Result<NodeId, EditorError> {
        let detached = || EditorError::DetachedNode { index: row.index };
        if row.generation != self.generation {
            return Err(detached());
        }
        let projected = self.rows.get(row.index).ok_or_else(detached)?;
        let node = projected.node();
        if node.generation != self.generation {
            return Err(detached());
        }
        match self.tree.get(node.node) {
            Some(n) if n.is_element_named(RULE_ELEMENT) => Ok(node.node),
            _ => Err(detached()),
        }
    }

    fn write_through(
        &mut self,
        index: usize,
        node: NodeId,
        field: RuleField,
        value: String,
    ) -> Result<(), EditorError> {
        trace!(row = index, %field, %value, "write attribute");
        self.tree
            .set_attribute(node, field.attribute_name(), &value)
            .map_err(|_| EditorError::DetachedNode { index })?;
        *self.rows[index].field_mut(field) = value;
        Ok(())
    }
}
