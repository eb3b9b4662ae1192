//! # Signature rule model
//!
//! A [`RuleRow`] is the flat, editable projection of one `<SignatureRule>`
//! element. Rows are never edited directly; every write goes through
//! [`SignaturesDocument`](crate::SignaturesDocument) so the element and the
//! row can't drift apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sigedit_xml::{NodeId, Tree};

use crate::EditorError;

/// Editable attributes of a `<SignatureRule>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    Id,
    Actions,
    Category,
    Enabled,
    Source,
    #[serde(rename = "sourceid")]
    SourceId,
    Type,
    Version,
    Cpu,
    Year,
    Severity,
}

impl RuleField {
    pub const ALL: [RuleField; 11] = [
        RuleField::Id,
        RuleField::Actions,
        RuleField::Category,
        RuleField::Enabled,
        RuleField::Source,
        RuleField::SourceId,
        RuleField::Type,
        RuleField::Version,
        RuleField::Cpu,
        RuleField::Year,
        RuleField::Severity,
    ];

    /// Attribute name as it appears on the element
    pub fn attribute_name(self) -> &'static str {
        match self {
            RuleField::Id => "id",
            RuleField::Actions => "actions",
            RuleField::Category => "category",
            RuleField::Enabled => "enabled",
            RuleField::Source => "source",
            RuleField::SourceId => "sourceid",
            RuleField::Type => "type",
            RuleField::Version => "version",
            RuleField::Cpu => "cpu",
            RuleField::Year => "year",
            RuleField::Severity => "severity",
        }
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

impl FromStr for RuleField {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleField::ALL
            .into_iter()
            .find(|field| field.attribute_name() == s)
            .ok_or_else(|| EditorError::UnknownField(s.to_string()))
    }
}

/// Tokens understood inside the `actions` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Block,
    Log,
    Stats,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Block, Action::Log, Action::Stats];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Block => "block",
            Action::Log => "log",
            Action::Stats => "stats",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EditorError::UnknownAction(s.to_string()))
    }
}

/// Value of the `enabled` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Enabled {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl Enabled {
    pub fn as_str(self) -> &'static str {
        match self {
            Enabled::On => "ON",
            Enabled::Off => "OFF",
        }
    }

    /// State reached by toggling `current`. Only an exact `ON` turns off;
    /// empty or unexpected values turn on.
    pub fn toggled_from(current: &str) -> Enabled {
        if current == Enabled::On.as_str() {
            Enabled::Off
        } else {
            Enabled::On
        }
    }
}

impl fmt::Display for Enabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Enabled {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ON" => Ok(Enabled::On),
            "OFF" => Ok(Enabled::Off),
            _ => Err(EditorError::InvalidEnabled(s.to_string())),
        }
    }
}

/// Parsed view of a comma-separated `actions` value.
///
/// Tokens are trimmed and empties dropped; anything not recognized as an
/// [`Action`] is kept as-is so rewriting never loses data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSet<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> ActionSet<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let tokens = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn contains(&self, action: Action) -> bool {
        self.tokens.iter().any(|token| *token == action.as_str())
    }

    /// Normalized value with `action` present, appended at the end if missing
    pub fn with(&self, action: Action) -> String {
        let mut tokens = self.tokens.clone();
        if !self.contains(action) {
            tokens.push(action.as_str());
        }
        tokens.join(",")
    }

    /// Normalized value with every occurrence of `action` removed
    pub fn without(&self, action: Action) -> String {
        self.tokens
            .iter()
            .copied()
            .filter(|token| *token != action.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Handle to a rule element inside one parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) generation: u64,
    pub(crate) node: NodeId,
}

impl NodeRef {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Handle to a row of one parsed document.
///
/// Handles from a previously loaded document are rejected with
/// [`EditorError::DetachedNode`] instead of touching the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRef {
    pub(crate) generation: u64,
    pub(crate) index: usize,
}

impl RowRef {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Position of the row in document order
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Flat projection of one `<SignatureRule>`. Missing attributes read as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRow {
    pub(crate) id: String,
    pub(crate) actions: String,
    pub(crate) category: String,
    pub(crate) enabled: String,
    pub(crate) source: String,
    pub(crate) sourceid: String,
    #[serde(rename = "type")]
    pub(crate) rule_type: String,
    pub(crate) version: String,
    pub(crate) cpu: String,
    pub(crate) year: String,
    pub(crate) severity: String,
    pub(crate) log_string: String,
    #[serde(skip)]
    pub(crate) handle: RowRef,
    #[serde(skip)]
    pub(crate) node: NodeRef,
}

impl RuleRow {
    pub(crate) fn project(tree: &Tree, node: NodeId, handle: RowRef) -> Self {
        let attr = |field: RuleField| {
            tree.attribute(node, field.attribute_name())
                .map(|value| value.into_owned())
                .unwrap_or_default()
        };
        let log_string = tree
            .find_descendant(node, crate::document::LOG_STRING_ELEMENT)
            .map(|log| tree.text_content(log))
            .unwrap_or_default();

        Self {
            id: attr(RuleField::Id),
            actions: attr(RuleField::Actions),
            category: attr(RuleField::Category),
            enabled: attr(RuleField::Enabled),
            source: attr(RuleField::Source),
            sourceid: attr(RuleField::SourceId),
            rule_type: attr(RuleField::Type),
            version: attr(RuleField::Version),
            cpu: attr(RuleField::Cpu),
            year: attr(RuleField::Year),
            severity: attr(RuleField::Severity),
            log_string,
            handle,
            node: NodeRef {
                generation: handle.generation,
                node,
            },
        }
    }

    pub fn get(&self, field: RuleField) -> &str {
        match field {
            RuleField::Id => &self.id,
            RuleField::Actions => &self.actions,
            RuleField::Category => &self.category,
            RuleField::Enabled => &self.enabled,
            RuleField::Source => &self.source,
            RuleField::SourceId => &self.sourceid,
            RuleField::Type => &self.rule_type,
            RuleField::Version => &self.version,
            RuleField::Cpu => &self.cpu,
            RuleField::Year => &self.year,
            RuleField::Severity => &self.severity,
        }
    }

    pub(crate) fn field_mut(&mut self, field: RuleField) -> &mut String {
        match field {
            RuleField::Id => &mut self.id,
            RuleField::Actions => &mut self.actions,
            RuleField::Category => &mut self.category,
            RuleField::Enabled => &mut self.enabled,
            RuleField::Source => &mut self.source,
            RuleField::SourceId => &mut self.sourceid,
            RuleField::Type => &mut self.rule_type,
            RuleField::Version => &mut self.version,
            RuleField::Cpu => &mut self.cpu,
            RuleField::Year => &mut self.year,
            RuleField::Severity => &mut self.severity,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn actions(&self) -> &str {
        &self.actions
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn enabled(&self) -> &str {
        &self.enabled
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }

    pub fn log_string(&self) -> &str {
        &self.log_string
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled == Enabled::On.as_str()
    }

    pub fn has_action(&self, action: Action) -> bool {
        ActionSet::parse(&self.actions).contains(action)
    }

    pub fn handle(&self) -> RowRef {
        self.handle
    }

    pub fn node(&self) -> NodeRef {
        self.node
    }
}
