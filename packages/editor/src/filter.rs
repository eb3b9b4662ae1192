//! Row filtering and facet values for the filter controls

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::rule::{Action, Enabled, RuleRow};

/// Conjunction of optional criteria. `None` and empty strings match any row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleFilter {
    pub category: Option<String>,
    pub severity: Option<String>,
    pub enabled: Option<Enabled>,
    pub block: Option<bool>,
    pub log: Option<bool>,
    pub stats: Option<bool>,

    /// Case-insensitive substring of the id or the log string
    pub search: Option<String>,
}

impl RuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_enabled(mut self, enabled: Enabled) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_action(mut self, action: Action, present: bool) -> Self {
        self.set_action(action, Some(present));
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn action(&self, action: Action) -> Option<bool> {
        match action {
            Action::Block => self.block,
            Action::Log => self.log,
            Action::Stats => self.stats,
        }
    }

    pub fn set_action(&mut self, action: Action, present: Option<bool>) {
        match action {
            Action::Block => self.block = present,
            Action::Log => self.log = present,
            Action::Stats => self.stats = present,
        }
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        active(&self.category).is_none()
            && active(&self.severity).is_none()
            && self.enabled.is_none()
            && Action::ALL.iter().all(|a| self.action(*a).is_none())
            && active(&self.search).is_none()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, row: &RuleRow) -> bool {
        if let Some(category) = active(&self.category) {
            if row.category() != category {
                return false;
            }
        }
        if let Some(severity) = active(&self.severity) {
            if row.severity() != severity {
                return false;
            }
        }
        if let Some(enabled) = self.enabled {
            if row.enabled() != enabled.as_str() {
                return false;
            }
        }
        for action in Action::ALL {
            if let Some(wanted) = self.action(action) {
                if row.has_action(action) != wanted {
                    return false;
                }
            }
        }
        if let Some(search) = active(&self.search) {
            let needle = search.to_lowercase();
            let hit = row.id().to_lowercase().contains(&needle)
                || row.log_string().to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Matching rows, order preserved
    pub fn apply<'a>(&self, rows: &'a [RuleRow]) -> Vec<&'a RuleRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Distinct values offered by the category and severity dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub severities: Vec<String>,
}

impl Facets {
    pub fn collect(rows: &[RuleRow]) -> Self {
        let distinct = |get: fn(&RuleRow) -> &str| -> Vec<String> {
            rows.iter()
                .map(get)
                .filter(|value| !value.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        Self {
            categories: distinct(RuleRow::category),
            severities: distinct(RuleRow::severity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SignaturesDocument;

    const SOURCE: &str = r#"<SignaturesFile>
<SignatureRule id="100" actions="block,log" category="web-cgi" enabled="ON" severity="HIGH"><LogString>CGI Shell Access</LogString></SignatureRule>
<SignatureRule id="200" actions="log" category="web-php" enabled="OFF" severity="LOW"><LogString>PHP info leak</LogString></SignatureRule>
<SignatureRule id="300" actions="" category="web-cgi" enabled="OFF" severity="HIGH"/>
</SignaturesFile>"#;

    fn ids<'a>(filter: &RuleFilter, doc: &'a SignaturesDocument) -> Vec<&'a str> {
        filter.apply(doc.rows()).into_iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let doc = SignaturesDocument::parse(SOURCE).unwrap();
        let filter = RuleFilter::new().with_category("");
        assert!(filter.is_empty());
        assert_eq!(ids(&filter, &doc), vec!["100", "200", "300"]);
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let doc = SignaturesDocument::parse(SOURCE).unwrap();
        let filter = RuleFilter::new()
            .with_category("web-cgi")
            .with_enabled(Enabled::Off);
        assert_eq!(ids(&filter, &doc), vec!["300"]);
    }

    #[test]
    fn test_action_filters() {
        let doc = SignaturesDocument::parse(SOURCE).unwrap();
        let blocking = RuleFilter::new().with_action(Action::Block, true);
        assert_eq!(ids(&blocking, &doc), vec!["100"]);

        let not_logging = RuleFilter::new().with_action(Action::Log, false);
        assert_eq!(ids(&not_logging, &doc), vec!["300"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_id_and_log_string() {
        let doc = SignaturesDocument::parse(SOURCE).unwrap();
        assert_eq!(ids(&RuleFilter::new().with_search("shell"), &doc), vec!["100"]);
        assert_eq!(ids(&RuleFilter::new().with_search("PHP"), &doc), vec!["200"]);
        assert_eq!(ids(&RuleFilter::new().with_search("30"), &doc), vec!["300"]);
    }

    #[test]
    fn test_facets_are_sorted_and_distinct() {
        let doc = SignaturesDocument::parse(SOURCE).unwrap();
        let facets = Facets::collect(doc.rows());
        assert_eq!(facets.categories, vec!["web-cgi", "web-php"]);
        assert_eq!(facets.severities, vec!["HIGH", "LOW"]);
    }
}
