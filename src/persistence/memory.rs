use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::helpers::time::now_i64;
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub value: String,
    pub expires_at: i64, // UNIX timestamp
}

impl Entry {
    pub(crate) fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_owned(),
            expires_at: now_i64() + ttl.as_secs() as i64,
        }
    }

    pub(crate) fn live_value(&self) -> Option<String> {
        if now_i64() >= self.expires_at {
            return None;
        }
        Some(self.value.clone())
    }
}

/// In-memory entry store with per-entry expiry
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().await;
        map.get(key).and_then(|entry| entry.live_value())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut map = self.inner.write().await;
        map.insert(key.to_owned(), Entry::new(value, ttl));
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let mut map = self.inner.write().await;
        map.remove(key);
        Ok(())
    }
}
