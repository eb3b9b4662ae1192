use crate::commands::{open_session, resolve, ViewArgs, YesNo};
use crate::config::Config;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use sigedit_editor::{Action, EditSession, Facets, PageInfo, RuleRow};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Signatures XML file
    pub file: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Only rules that do (yes) or don't (no) block
    #[arg(long)]
    pub block: Option<YesNo>,

    /// Only rules that do (yes) or don't (no) log
    #[arg(long)]
    pub log: Option<YesNo>,

    /// Only rules that do (yes) or don't (no) collect stats
    #[arg(long)]
    pub stats: Option<YesNo>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print the available categories and severities
    #[arg(long)]
    pub facets: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing<'a> {
    page: PageInfo,
    rows: Vec<&'a RuleRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    facets: Option<Facets>,
}

pub fn list(args: ListArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let filter = args.view.filter([
        (Action::Block, args.block),
        (Action::Log, args.log),
        (Action::Stats, args.stats),
    ]);
    let session = open_session(&resolve(cwd, &args.file), &args.view, filter, &config)?;

    match args.format {
        OutputFormat::Json => print_json(&session, args.facets),
        OutputFormat::Text => {
            print_text(&session, args.facets);
            Ok(())
        }
    }
}

fn print_json(session: &EditSession, with_facets: bool) -> Result<()> {
    let listing = Listing {
        page: session.page_info(),
        rows: session.page_rows(),
        facets: with_facets.then(|| session.facets()),
    };
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn print_text(session: &EditSession, with_facets: bool) {
    let rows = session.page_rows();
    let info = session.page_info();

    if rows.is_empty() {
        println!("{}", "No rules match the current filters".yellow());
    } else {
        println!(
            "{:<10} {:<4} {:<16} {:<16} {:<8} {}",
            "ID".bold(),
            "ON".bold(),
            "ACTIONS".bold(),
            "CATEGORY".bold(),
            "SEVERITY".bold(),
            "LOG STRING".bold()
        );
        for row in &rows {
            let enabled = if row.is_enabled() {
                "ON".green()
            } else {
                row.enabled().red()
            };
            println!(
                "{:<10} {:<4} {:<16} {:<16} {:<8} {}",
                row.id(),
                enabled,
                row.actions(),
                row.category(),
                row.severity(),
                row.log_string()
            );
        }
    }

    println!();
    println!(
        "Showing {} to {} of {} results",
        info.first, info.last, info.total
    );
    println!("Page {} of {}", info.page, info.page_count);

    if with_facets {
        let facets = session.facets();
        println!();
        println!("{} {}", "Categories:".bright_blue(), facets.categories.join(", "));
        println!("{} {}", "Severities:".bright_blue(), facets.severities.join(", "));
    }
}
