use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sigedit_relay::{router, spawn_sweeper, ArtifactStore, RelayConfig};
use tracing_subscriber::EnvFilter;

/// Sigedit relay - temporary download links for edited signatures files
#[derive(Parser, Debug)]
#[command(name = "sigedit-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ./sigedit-relay.config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for published files
    #[arg(long)]
    uploads_dir: Option<PathBuf>,

    /// Seconds a published file stays downloadable
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Serve static files from this directory for unmatched routes
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::load_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RelayConfig::load(&std::env::current_dir()?)?,
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = &self.uploads_dir {
            config.uploads_dir = dir.clone();
        }
        if let Some(ttl) = self.ttl_secs {
            config.ttl_secs = ttl;
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    let store = ArtifactStore::open(&config.uploads_dir, config.ttl())
        .await
        .with_context(|| format!("Failed to open uploads dir {}", config.uploads_dir.display()))?;
    let store = Arc::new(store);
    let sweeper = spawn_sweeper(store.clone(), config.sweep_interval());

    let app = router(store, &config);
    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    tracing::info!(
        %address,
        uploads_dir = %config.uploads_dir.display(),
        ttl_secs = config.ttl_secs,
        "relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    sweeper.abort();
    Ok(())
}
