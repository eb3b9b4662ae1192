pub mod edit;
pub mod init;
pub mod list;

pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use list::{list, ListArgs};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use sigedit_editor::{Action, EditSession, Enabled, PageSize, RuleFilter};
use std::path::{Path, PathBuf};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value == YesNo::Yes
    }
}

/// Filter and paging flags shared by `list` and `edit`
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Only rules in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only rules with this severity
    #[arg(long)]
    pub severity: Option<String>,

    /// Only rules in this state (ON or OFF)
    #[arg(long)]
    pub enabled: Option<Enabled>,

    /// Case-insensitive match against id and log string
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page, or "all" (overrides config)
    #[arg(long)]
    pub page_size: Option<PageSize>,
}

impl ViewArgs {
    pub fn filter(&self, actions: [(Action, Option<YesNo>); 3]) -> RuleFilter {
        let mut filter = RuleFilter {
            category: self.category.clone(),
            severity: self.severity.clone(),
            enabled: self.enabled,
            search: self.search.clone(),
            ..RuleFilter::default()
        };
        for (action, wanted) in actions {
            filter.set_action(action, wanted.map(bool::from));
        }
        filter
    }
}

/// Load `file` into a session with the filter, page size and page applied
pub fn open_session(
    file: &Path,
    view: &ViewArgs,
    filter: RuleFilter,
    config: &Config,
) -> Result<EditSession> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut session = EditSession::with_page_size(view.page_size.unwrap_or(config.page_size));
    session
        .load(&source)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    session.set_filter(filter);
    session.set_page(view.page);
    Ok(session)
}

pub fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
