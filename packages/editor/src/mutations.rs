//! # Rule Mutations
//!
//! Row-level edits, applied by
//! [`SignaturesDocument::apply_batch`](crate::SignaturesDocument::apply_batch).
//!
//! ## Mutation Semantics
//!
//! ### SetField / SetEnabled
//! - Plain replacement of one attribute value
//! - Writing the value already present is a no-op
//!
//! ### ToggleEnabled
//! - `ON` becomes `OFF`; any other value (including missing) becomes `ON`
//! - Evaluated per row, so a mixed selection flips each row independently
//!
//! ### SetAction / ToggleAction
//! - The `actions` list is only rewritten when membership changes
//! - A rewrite trims tokens, drops empties, and joins with `,`
//! - Added actions go to the end of the list

use serde::{Deserialize, Serialize};

use crate::rule::{Action, ActionSet, Enabled, RuleField, RuleRow};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Replace any attribute value
    SetField { field: RuleField, value: String },

    SetEnabled { enabled: Enabled },

    ToggleEnabled,

    /// Force an action token in or out of the `actions` list
    SetAction { action: Action, present: bool },

    ToggleAction { action: Action },
}

impl Mutation {
    /// Attribute writes this mutation produces for `row`.
    ///
    /// Values equal to what the row already holds are left out.
    pub fn changes(&self, row: &RuleRow) -> Vec<(RuleField, String)> {
        let change = match self {
            Mutation::SetField { field, value } => Some((*field, value.clone())),
            Mutation::SetEnabled { enabled } => {
                Some((RuleField::Enabled, enabled.as_str().to_string()))
            }
            Mutation::ToggleEnabled => Some((
                RuleField::Enabled,
                Enabled::toggled_from(row.enabled()).as_str().to_string(),
            )),
            Mutation::SetAction { action, present } => action_change(row, *action, *present),
            Mutation::ToggleAction { action } => {
                let present = !row.has_action(*action);
                action_change(row, *action, present)
            }
        };

        change
            .filter(|(field, value)| row.get(*field) != value.as_str())
            .into_iter()
            .collect()
    }
}

fn action_change(row: &RuleRow, action: Action, present: bool) -> Option<(RuleField, String)> {
    let set = ActionSet::parse(row.actions());
    if set.contains(action) == present {
        return None;
    }
    let value = if present {
        set.with(action)
    } else {
        set.without(action)
    };
    Some((RuleField::Actions, value))
}

/// Outcome of a successful batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    /// Document revision after the batch
    pub revision: u64,

    /// Rows that received at least one write
    pub rows_changed: usize,
}
