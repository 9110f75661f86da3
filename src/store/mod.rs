//! Key/value persistence for chart state blobs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ChartResult;

/// Asynchronous string store. Each call is a single attempt; failures are
/// reported as [`ChartError::Io`](crate::error::ChartError::Io).
pub trait DataStore {
    fn save(&self, key: &str, data: &str) -> impl Future<Output = ChartResult<()>> + Send;

    /// `None` when nothing is stored under `key`.
    fn load(&self, key: &str) -> impl Future<Output = ChartResult<Option<String>>> + Send;

    /// Removes `key`, or every key of this store when `None`.
    fn clear(&self, key: Option<&str>) -> impl Future<Output = ChartResult<()>> + Send;
}

/// In-process store. Clones share the same entries.
///
/// Entries are keyed by `(prefix, key)`, so stores scoped to different
/// prefixes never see or clear each other's keys, even when one prefix
/// starts with another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataStore {
    prefix: String,
    entries: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl MemoryDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Store with another prefix over the same entries.
    #[must_use]
    pub fn scoped(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Arc::clone(&self.entries),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> (String, String) {
        (self.prefix.clone(), key.to_owned())
    }

    /// Number of keys visible through this store.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.keys().filter(|(prefix, _)| *prefix == self.prefix).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl DataStore for MemoryDataStore {
    async fn save(&self, key: &str, data: &str) -> ChartResult<()> {
        let full_key = self.full_key(key);
        debug!(prefix = %self.prefix, key, bytes = data.len(), "state saved");
        self.entries.write().await.insert(full_key, data.to_owned());
        Ok(())
    }

    async fn load(&self, key: &str) -> ChartResult<Option<String>> {
        Ok(self.entries.read().await.get(&self.full_key(key)).cloned())
    }

    async fn clear(&self, key: Option<&str>) -> ChartResult<()> {
        let mut entries = self.entries.write().await;
        match key {
            Some(key) => {
                entries.remove(&self.full_key(key));
            }
            None => entries.retain(|(prefix, _), _| *prefix != self.prefix),
        }
        Ok(())
    }
}
