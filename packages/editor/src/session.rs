//! # Edit Session Management
//!
//! Holds at most one loaded document together with the view state around
//! it: filter, page and selection.
//!
//! Filter and page size changes return to page 1. Loading a new document
//! clears the selection and returns to page 1 but keeps the filter.

use serde::Serialize;
use tracing::{debug, info};

use crate::filter::{Facets, RuleFilter};
use crate::mutations::{Mutation, MutationResult};
use crate::pagination::{PageInfo, PageSize, Pager};
use crate::rule::{Action, RuleField, RuleRow};
use crate::selection::Selection;
use crate::{EditorError, SignaturesDocument};

/// File name offered when saving edited output
pub const EXPORT_FILE_NAME: &str = "edited_signatures.xml";

#[derive(Debug, Default)]
pub struct EditSession {
    document: Option<SignaturesDocument>,
    filter: RuleFilter,
    selection: Selection,
    pager: Pager,
}

/// Row counts for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub shown: usize,
    pub total: usize,
    pub selected: usize,
}

fn visible<'a>(document: Option<&'a SignaturesDocument>, filter: &RuleFilter) -> Vec<&'a RuleRow> {
    document
        .map(|doc| filter.apply(doc.rows()))
        .unwrap_or_default()
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            pager: Pager::new(page_size),
            ..Self::default()
        }
    }

    /// Parse `source` and make it the live document.
    ///
    /// On error the previous document and view state are kept as they were.
    pub fn load(&mut self, source: &str) -> Result<&SignaturesDocument, EditorError> {
        let document = SignaturesDocument::parse(source)?;
        info!(
            rules = document.len(),
            generation = document.generation(),
            "loaded signatures"
        );
        self.selection.clear();
        self.pager.reset();
        Ok(self.document.insert(document))
    }

    pub fn document(&self) -> Option<&SignaturesDocument> {
        self.document.as_ref()
    }

    /// Direct access for handle-based edits
    pub fn document_mut(&mut self) -> Option<&mut SignaturesDocument> {
        self.document.as_mut()
    }

    fn require_document(&mut self) -> Result<&mut SignaturesDocument, EditorError> {
        self.document.as_mut().ok_or(EditorError::NoDocument)
    }

    pub fn filter(&self) -> &RuleFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: RuleFilter) {
        self.filter = filter;
        self.pager.reset();
    }

    /// Edit the filter in place
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut RuleFilter)) {
        edit(&mut self.filter);
        self.pager.reset();
    }

    pub fn reset_filters(&mut self) {
        self.set_filter(RuleFilter::default());
    }

    pub fn facets(&self) -> Facets {
        self.document
            .as_ref()
            .map(|doc| Facets::collect(doc.rows()))
            .unwrap_or_default()
    }

    /// Rows passing the filter, in document order
    pub fn filtered_rows(&self) -> Vec<&RuleRow> {
        visible(self.document.as_ref(), &self.filter)
    }

    /// Filtered rows on the current page
    pub fn page_rows(&self) -> Vec<&RuleRow> {
        self.pager.slice(&self.filtered_rows()).to_vec()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn page_info(&self) -> PageInfo {
        self.pager.info(self.filtered_rows().len())
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.filtered_rows().len();
        self.pager.set_page(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.filtered_rows().len();
        self.pager.next(total);
    }

    pub fn previous_page(&mut self) {
        let total = self.filtered_rows().len();
        self.pager.previous(total);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.pager.set_page_size(page_size);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggle_selected(&mut self, id: &str) -> bool {
        self.selection.toggle(id)
    }

    pub fn select_current_page(&mut self) -> usize {
        let rows = visible(self.document.as_ref(), &self.filter);
        self.selection.select_page(self.pager.slice(&rows).iter().copied())
    }

    pub fn deselect_current_page(&mut self) -> usize {
        let rows = visible(self.document.as_ref(), &self.filter);
        self.selection.deselect_page(self.pager.slice(&rows).iter().copied())
    }

    pub fn current_page_selected(&self) -> bool {
        self.selection
            .page_fully_selected(self.page_rows().into_iter())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Apply `mutation` to every row carrying `id`
    pub fn apply_to_id(&mut self, id: &str, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        let document = self.require_document()?;
        let rows = document.row_refs_by_id(id);
        if rows.is_empty() {
            return Err(EditorError::RowNotFound(id.to_string()));
        }
        document.apply_batch(&rows, mutation)
    }

    pub fn set_field(
        &mut self,
        id: &str,
        field: RuleField,
        value: impl Into<String>,
    ) -> Result<MutationResult, EditorError> {
        let mutation = Mutation::SetField {
            field,
            value: value.into(),
        };
        self.apply_to_id(id, &mutation)
    }

    pub fn toggle_enabled(&mut self, id: &str) -> Result<MutationResult, EditorError> {
        self.apply_to_id(id, &Mutation::ToggleEnabled)
    }

    pub fn toggle_action(&mut self, id: &str, action: Action) -> Result<MutationResult, EditorError> {
        self.apply_to_id(id, &Mutation::ToggleAction { action })
    }

    /// Apply `mutation` to every selected row, whether or not the current
    /// filter shows it
    pub fn apply_to_selection(&mut self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        let document = self.document.as_mut().ok_or(EditorError::NoDocument)?;
        let rows = document.refs_for_ids(self.selection.ids());
        let result = document.apply_batch(&rows, mutation)?;
        debug!(
            selected = self.selection.len(),
            rows = rows.len(),
            rows_changed = result.rows_changed,
            "applied mutation to selection"
        );
        Ok(result)
    }

    /// Serialized XML of the live document
    pub fn export(&self) -> Result<String, EditorError> {
        let document = self.document.as_ref().ok_or(EditorError::NoDocument)?;
        let xml = document.to_xml();
        info!(bytes = xml.len(), revision = document.revision(), "exported signatures");
        Ok(xml)
    }

    pub fn export_file_name(&self) -> &'static str {
        EXPORT_FILE_NAME
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            shown: self.filtered_rows().len(),
            total: self.document.as_ref().map_or(0, SignaturesDocument::len),
            selected: self.selection.len(),
        }
    }
}
