//! # Sigedit Relay
//!
//! Short-lived sharing of exported signatures files. A published document
//! gets a random download URL that stops working after a fixed interval
//! (15 minutes by default).

mod config;
mod error;
mod server;
mod store;

pub use config::{RelayConfig, DEFAULT_CONFIG_NAME};
pub use error::RelayError;
pub use server::{describe_ttl, router, PublishResponse, DOWNLOAD_FILE_NAME};
pub use store::{spawn_sweeper, Artifact, ArtifactStore, Published};
