use crate::commands::{open_session, resolve, ViewArgs, YesNo};
use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use sigedit_editor::{Action, EditSession, EditorError, Enabled, Mutation, RuleField};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Signatures XML file
    pub file: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Page filter: rules that do (yes) or don't (no) block
    #[arg(long)]
    pub has_block: Option<YesNo>,

    /// Page filter: rules that do (yes) or don't (no) log
    #[arg(long)]
    pub has_log: Option<YesNo>,

    /// Page filter: rules that do (yes) or don't (no) collect stats
    #[arg(long)]
    pub has_stats: Option<YesNo>,

    /// Select a rule by id (repeatable)
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Select every rule on the filtered page given by --page
    #[arg(long)]
    pub select_page: bool,

    /// Turn selected rules on
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Turn selected rules off
    #[arg(long)]
    pub disable: bool,

    /// Add (on) or remove (off) the block action
    #[arg(long)]
    pub block: Option<Switch>,

    /// Add (on) or remove (off) the log action
    #[arg(long)]
    pub log: Option<Switch>,

    /// Add (on) or remove (off) the stats action
    #[arg(long)]
    pub stats: Option<Switch>,

    /// Set any rule attribute, e.g. --set severity=HIGH (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(RuleField, String)>,

    /// Output file (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the edited document instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

fn parse_assignment(raw: &str) -> Result<(RuleField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.trim().parse::<RuleField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

impl EditArgs {
    fn mutations(&self) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        if self.enable {
            mutations.push(Mutation::SetEnabled {
                enabled: Enabled::On,
            });
        }
        if self.disable {
            mutations.push(Mutation::SetEnabled {
                enabled: Enabled::Off,
            });
        }
        for (action, switch) in [
            (Action::Block, self.block),
            (Action::Log, self.log),
            (Action::Stats, self.stats),
        ] {
            if let Some(switch) = switch {
                mutations.push(Mutation::SetAction {
                    action,
                    present: switch == Switch::On,
                });
            }
        }
        for (field, value) in &self.assignments {
            mutations.push(Mutation::SetField {
                field: *field,
                value: value.clone(),
            });
        }
        mutations
    }
}

pub fn edit(args: EditArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let mutations = args.mutations();
    if mutations.is_empty() {
        bail!("Nothing to change: pass --enable, --disable, --block, --log, --stats or --set");
    }

    let file = resolve(cwd, &args.file);
    let filter = args.view.filter([
        (Action::Block, args.has_block),
        (Action::Log, args.has_log),
        (Action::Stats, args.has_stats),
    ]);
    let mut session = open_session(&file, &args.view, filter, &config)?;

    select(&mut session, &args)?;
    let selected = session.selection().len();

    let mut changed = 0;
    for mutation in &mutations {
        changed += session.apply_to_selection(mutation)?.rows_changed;
    }
    let xml = session.export()?;

    if args.stdout {
        print!("{xml}");
        return Ok(());
    }

    let output = match &args.output {
        Some(path) => resolve(cwd, path),
        None => config.output_path(cwd),
    };
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, xml).with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "  {} {} selected, {} changed → {}",
        "✓".green(),
        selected,
        changed,
        output.display()
    );
    Ok(())
}

fn select(session: &mut EditSession, args: &EditArgs) -> Result<()> {
    let document = session.document().ok_or(EditorError::NoDocument)?;
    if let Some(missing) = args.ids.iter().find(|id| document.find(id).is_none()) {
        return Err(EditorError::RowNotFound(missing.clone()).into());
    }

    for id in &args.ids {
        if !session.selection().contains(id) {
            session.toggle_selected(id);
        }
    }
    if args.select_page {
        session.select_current_page();
    }

    if session.selection().is_empty() {
        return Err(anyhow!("No rules selected: pass --id or --select-page"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("severity=HIGH").unwrap(),
            (RuleField::Severity, "HIGH".to_string())
        );
        assert_eq!(
            parse_assignment("category=a=b").unwrap(),
            (RuleField::Category, "a=b".to_string())
        );
        assert!(parse_assignment("severity").is_err());
        assert!(parse_assignment("priority=1").is_err());
    }
}
