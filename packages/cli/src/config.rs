use serde::{Deserialize, Serialize};
use sigedit_editor::{PageSize, EXPORT_FILE_NAME};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "sigedit.config.json";

/// Sigedit configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Rows per page for `list` and `edit --select-page` (a number or "all")
    #[serde(default)]
    pub page_size: PageSize,

    /// Where `edit` writes when no --output is given
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

fn default_output_file() -> String {
    EXPORT_FILE_NAME.to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Output path, relative paths resolved against `cwd`
    pub fn output_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.output_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            output_file: default_output_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "pageSize": "all",
            "outputFile": "out/signatures.xml"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.page_size, PageSize::All);
        assert_eq!(config.output_file, "out/signatures.xml");
    }

    #[test]
    fn test_numeric_page_size() {
        let config: Config = serde_json::from_str(r#"{ "pageSize": 20 }"#).unwrap();
        assert_eq!(config.page_size, PageSize::Fixed(20));
        assert_eq!(config.output_file, "edited_signatures.xml");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_size, PageSize::Fixed(50));
        assert_eq!(
            config.output_path(Path::new("/work")),
            PathBuf::from("/work/edited_signatures.xml")
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "pageSize": 10 }"#).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.page_size, PageSize::Fixed(10));
    }
}
