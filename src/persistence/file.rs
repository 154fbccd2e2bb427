use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::helpers::time::now_i64;
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    expires_at: i64, // UNIX timestamp
}

/// File-backed entry store: one JSON document, replaced atomically on
/// every mutation (write to a sibling temp file, then rename).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    inner: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl FileStore {
    /// Open the store at `path`, loading whatever document is already
    /// there. A missing file is an empty store, not an error.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str::<HashMap<String, StoredEntry>>(&raw)
                .with_context(|| format!("invalid store document at {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(anyhow!("reading {}: {}", path.display(), err)),
        };
        debug!("file store opened, path: {}, entries: {}", path.display(), entries.len());
        Ok(Self {
            path,
            inner: Arc::new(RwLock::new(entries)),
        })
    }

    async fn persist(&self, entries: &HashMap<String, StoredEntry>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw.as_bytes())
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().await;
        map.get(key)
            .filter(|entry| now_i64() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut map = self.inner.write().await;
        map.insert(
            key.to_owned(),
            StoredEntry {
                value: value.to_owned(),
                expires_at: now_i64() + ttl.as_secs() as i64,
            },
        );
        self.persist(&map).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let mut map = self.inner.write().await;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&map).await.map_err(|err| {
            warn!("file store cleanup failed: {}", err);
            err
        })
    }
}
