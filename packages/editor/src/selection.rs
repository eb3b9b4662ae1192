//! Selected rule ids.
//!
//! Selection is keyed by id rather than row position so it survives filter
//! and page changes. Page-wide select and deselect only touch the rows on
//! that page.

use std::collections::BTreeSet;

use crate::rule::RuleRow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }

    /// Returns true if the id was not selected before
    pub fn select(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flip one id, returning whether it is now selected
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Add every row of a page; returns how many were newly selected
    pub fn select_page<'a>(&mut self, rows: impl IntoIterator<Item = &'a RuleRow>) -> usize {
        rows.into_iter().filter(|row| self.select(row.id())).count()
    }

    /// Remove every row of a page; returns how many were deselected
    pub fn deselect_page<'a>(&mut self, rows: impl IntoIterator<Item = &'a RuleRow>) -> usize {
        rows.into_iter().filter(|row| self.deselect(row.id())).count()
    }

    /// True for a non-empty page whose rows are all selected
    pub fn page_fully_selected<'a>(&self, rows: impl IntoIterator<Item = &'a RuleRow>) -> bool {
        let mut any = false;
        for row in rows {
            if !self.contains(row.id()) {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SignaturesDocument;

    fn doc() -> SignaturesDocument {
        SignaturesDocument::parse(
            r#"<SignaturesFile><SignatureRule id="a"/><SignatureRule id="b"/><SignatureRule id="c"/></SignaturesFile>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle("a"));
        assert!(selection.contains("a"));
        assert!(!selection.toggle("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_page_select_leaves_other_pages_alone() {
        let doc = doc();
        let mut selection = Selection::new();
        selection.select("c");

        let page = &doc.rows()[..2];
        assert_eq!(selection.select_page(page), 2);
        assert!(selection.page_fully_selected(page));
        assert_eq!(selection.len(), 3);

        assert_eq!(selection.deselect_page(page), 2);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_empty_page_is_not_selected() {
        let selection = Selection::new();
        assert!(!selection.page_fully_selected(&[] as &[RuleRow]));
    }
}
