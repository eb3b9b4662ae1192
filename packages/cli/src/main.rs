mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, init, list, EditArgs, InitArgs, ListArgs};
use tracing_subscriber::EnvFilter;

/// Sigedit - review and bulk-edit NetScaler signatures files
#[derive(Parser, Debug)]
#[command(name = "sigedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sigedit.config.json in the current directory
    Init(InitArgs),

    /// List rules with filtering and paging
    List(ListArgs),

    /// Apply edits to selected rules and write the whole document back out
    Edit(EditArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::List(args) => list(args, &cwd),
        Command::Edit(args) => edit(args, &cwd),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
