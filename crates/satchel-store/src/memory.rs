//! In-process store backed by a `HashMap`.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{KeyValueStore, StoreError};

/// A [`KeyValueStore`] that keeps everything in memory.
///
/// Sessions vanish when the process exits and are not shared between
/// server instances. Good for tests, demos, and single-node deployments.
///
/// Reads take a shared lock, writes an exclusive one. The lock is never
/// held across an `.await` on anything else.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn store(&self, id: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.write().await.insert(id.to_string(), value);
        tracing::trace!(session_id = id, "stored session bytes");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if self.entries.write().await.remove(id).is_some() {
            tracing::trace!(session_id = id, "deleted session bytes");
        }
        Ok(())
    }
}
