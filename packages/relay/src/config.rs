use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "sigedit-relay.config.json";

/// Ten years
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Relay configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,

    /// Directory holding published artifacts
    pub uploads_dir: PathBuf,

    /// How long a published artifact stays downloadable
    pub ttl_secs: u64,

    pub sweep_interval_secs: u64,

    /// Largest accepted publish request body
    pub body_limit_bytes: usize,

    /// Optional directory of static files served for unmatched routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            uploads_dir: PathBuf::from("uploads"),
            ttl_secs: 15 * 60,
            sweep_interval_secs: 60,
            body_limit_bytes: 50 * 1024 * 1024,
            static_dir: None,
        }
    }
}

impl RelayConfig {
    /// Load `sigedit-relay.config.json` from a directory, or defaults if absent
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            Self::load_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RelayConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ttl(&self) -> chrono::TimeDelta {
        let secs = self.ttl_secs.min(MAX_TTL_SECS);
        chrono::TimeDelta::seconds(secs as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
