use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sigedit_editor::PageSize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Rows per page, or "all"
    #[arg(long, default_value = "50")]
    pub page_size: PageSize,

    /// Default output file for `edit`
    #[arg(short, long, default_value = "edited_signatures.xml")]
    pub output_file: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        page_size: args.page_size,
        output_file: args.output_file,
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)? + "\n")?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(force: bool) -> InitArgs {
        InitArgs {
            page_size: PageSize::Fixed(20),
            output_file: "out.xml".to_string(),
            force,
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init(args(false), dir.path()).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.page_size, PageSize::Fixed(20));
        assert_eq!(config.output_file, "out.xml");
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&path, "{}").unwrap();

        init(args(false), dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        init(args(true), dir.path()).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
