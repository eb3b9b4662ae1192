//! # Artifact Store
//!
//! Published documents live as `<uuid>.xml` files in one directory. A
//! single map of [`Artifact`] records tracks when each one stops being
//! downloadable.
//!
//! Expiry is enforced twice: `fetch` refuses anything past its deadline,
//! and a sweeper task deletes expired files in the background. Every
//! `*_at` method takes the current time explicitly so expiry is testable
//! without waiting.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::RelayError;

const ARTIFACT_EXTENSION: &str = "xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Published {
    pub file_name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Artifact {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    ttl: TimeDelta,
    artifacts: Mutex<HashMap<String, Artifact>>,
}

impl ArtifactStore {
    /// Open `dir` as the upload directory, creating it if needed.
    ///
    /// Artifacts left behind by a previous process have no known deadline
    /// and are deleted.
    pub async fn open(dir: impl Into<PathBuf>, ttl: TimeDelta) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let mut removed = 0;
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_artifact_name(&path) {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, dir = %dir.display(), "removed leftover artifacts");
        }

        Ok(Self {
            dir,
            ttl,
            artifacts: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub async fn len(&self) -> usize {
        self.artifacts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn publish(&self, content: &str) -> Result<Published, RelayError> {
        self.publish_at(content, Utc::now()).await
    }

    /// Store `content` under a fresh random name. Publishing the same
    /// content twice yields two independent artifacts.
    pub async fn publish_at(&self, content: &str, now: DateTime<Utc>) -> Result<Published, RelayError> {
        if content.is_empty() {
            return Err(RelayError::NoContent);
        }

        let file_name = format!("{}.{ARTIFACT_EXTENSION}", Uuid::new_v4());
        let path = self.dir.join(&file_name);
        fs::write(&path, content).await.map_err(RelayError::Publish)?;

        let expires_at = now + self.ttl;
        let artifact = Artifact {
            path,
            created_at: now,
            expires_at,
        };
        self.artifacts.lock().await.insert(file_name.clone(), artifact);
        info!(file = %file_name, bytes = content.len(), %expires_at, "published artifact");

        Ok(Published {
            file_name,
            expires_at,
        })
    }

    pub async fn fetch(&self, file_name: &str) -> Result<Vec<u8>, RelayError> {
        self.fetch_at(file_name, Utc::now()).await
    }

    /// Contents of a published artifact. Valid while `now` is before its
    /// deadline; unknown names never touch the filesystem.
    pub async fn fetch_at(&self, file_name: &str, now: DateTime<Utc>) -> Result<Vec<u8>, RelayError> {
        let artifact = self
            .artifacts
            .lock()
            .await
            .get(file_name)
            .cloned()
            .ok_or(RelayError::NotFound)?;

        if artifact.is_expired(now) {
            self.artifacts.lock().await.remove(file_name);
            remove_file(&artifact.path).await;
            return Err(RelayError::NotFound);
        }

        match fs::read(&artifact.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.artifacts.lock().await.remove(file_name);
                Err(RelayError::NotFound)
            }
            Err(e) => Err(RelayError::Read(e)),
        }
    }

    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// Delete every artifact whose deadline has passed
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<Artifact> = {
            let mut artifacts = self.artifacts.lock().await;
            let names: Vec<String> = artifacts
                .iter()
                .filter(|(_, artifact)| artifact.is_expired(now))
                .map(|(name, _)| name.clone())
                .collect();
            names
                .iter()
                .filter_map(|name| artifacts.remove(name))
                .collect()
        };

        for artifact in &expired {
            remove_file(&artifact.path).await;
        }
        if !expired.is_empty() {
            debug!(removed = expired.len(), "swept expired artifacts");
        }
        expired.len()
    }
}

async fn remove_file(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete artifact"),
    }
}

fn is_artifact_name(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| Uuid::parse_str(stem).is_ok())
}

/// Run [`ArtifactStore::sweep`] every `every` until the task is aborted
pub fn spawn_sweeper(store: Arc<ArtifactStore>, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            store.sweep().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store(dir: &tempfile::TempDir) -> ArtifactStore {
        ArtifactStore::open(dir.path(), TimeDelta::minutes(15))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let t = Utc::now();

        let published = store.publish_at("<SignaturesFile/>", t).await.unwrap();
        assert_eq!(published.expires_at, t + TimeDelta::minutes(15));

        let body = store
            .fetch_at(&published.file_name, t + TimeDelta::minutes(14))
            .await
            .unwrap();
        assert_eq!(body, b"<SignaturesFile/>");

        let late = store
            .fetch_at(&published.file_name, t + TimeDelta::minutes(16))
            .await;
        assert!(matches!(late, Err(RelayError::NotFound)));
        assert!(!dir.path().join(&published.file_name).exists());
    }

    #[tokio::test]
    async fn test_deadline_itself_is_expired() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let t = Utc::now();
        let published = store.publish_at("x", t).await.unwrap();

        let at_deadline = store.fetch_at(&published.file_name, published.expires_at).await;
        assert!(matches!(at_deadline, Err(RelayError::NotFound)));
    }

    #[tokio::test]
    async fn test_same_content_publishes_independent_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        let a = store.publish("<a/>").await.unwrap();
        let b = store.publish("<a/>").await.unwrap();

        assert_ne!(a.file_name, b.file_name);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        assert!(matches!(store.publish("").await, Err(RelayError::NoContent)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let t = Utc::now();

        let old = store.publish_at("old", t).await.unwrap();
        let new = store
            .publish_at("new", t + TimeDelta::minutes(10))
            .await
            .unwrap();

        let removed = store.sweep_at(t + TimeDelta::minutes(20)).await;

        assert_eq!(removed, 1);
        assert!(!dir.path().join(&old.file_name).exists());
        assert!(dir.path().join(&new.file_name).exists());
    }

    #[tokio::test]
    async fn test_unknown_names_are_not_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "private").unwrap();
        let store = store(&dir).await;

        let result = store.fetch("notes.txt").await;
        assert!(matches!(result, Err(RelayError::NotFound)));
        let traversal = store.fetch("../etc/passwd").await;
        assert!(matches!(traversal, Err(RelayError::NotFound)));
    }

    #[tokio::test]
    async fn test_open_clears_leftover_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let leftover = dir.path().join(format!("{}.xml", Uuid::new_v4()));
        std::fs::write(&leftover, "<old/>").unwrap();
        std::fs::write(dir.path().join("keep.xml"), "<keep/>").unwrap();

        let _store = store(&dir).await;

        assert!(!leftover.exists());
        assert!(dir.path().join("keep.xml").exists());
    }
}
