//! Key-value store abstraction for Satchel.
//!
//! Server-side sessions live in a store keyed by session id. This crate
//! defines the [`KeyValueStore`] trait that the server-side backend talks
//! to, and ships a [`MemoryStore`] for tests and single-process servers.
//!
//! The store only sees opaque bytes. Encoding sessions is the job of the
//! codec layer above it:
//!
//! ```text
//! Backend (Session) → Codec (bytes) → Store (id → bytes)
//! ```
//!
//! # Feature Flags
//!
//! - `memory` (default): in-process [`MemoryStore`]

mod error;
#[cfg(feature = "memory")]
mod memory;

pub use error::StoreError;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;

use std::future::Future;
use std::sync::Arc;

/// A store mapping session ids to serialized session bytes.
///
/// Implementations must be safe to share across request tasks. Satchel
/// adds no locking of its own; whatever consistency the store offers is
/// what sessions get. In particular, two concurrent requests writing the
/// same id race, and the last write wins.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use std::sync::Mutex;
///
/// use satchel_store::{KeyValueStore, StoreError};
///
/// /// A store that forgets everything after one read.
/// #[derive(Default)]
/// struct ReadOnceStore(Mutex<HashMap<String, Vec<u8>>>);
///
/// impl KeyValueStore for ReadOnceStore {
///     async fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
///         Ok(self.0.lock().unwrap().remove(id))
///     }
///
///     async fn store(&self, id: &str, value: Vec<u8>) -> Result<(), StoreError> {
///         self.0.lock().unwrap().insert(id.to_string(), value);
///         Ok(())
///     }
///
///     async fn delete(&self, id: &str) -> Result<(), StoreError> {
///         self.0.lock().unwrap().remove(id);
///         Ok(())
///     }
/// }
/// ```
pub trait KeyValueStore: Send + Sync + 'static {
    /// Looks up the value stored under `id`.
    ///
    /// Returns `Ok(None)` when nothing is stored there. A miss is not an
    /// error.
    fn fetch(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Inserts or replaces the value stored under `id`.
    fn store(
        &self,
        id: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes the value stored under `id`. Deleting a missing id is a
    /// no-op.
    fn delete(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Sharing a store behind an `Arc` lets the host keep a handle to it
/// (for inspection or admin tasks) while a backend owns another.
impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    fn fetch(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send {
        (**self).fetch(id)
    }

    fn store(
        &self,
        id: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).store(id, value)
    }

    fn delete(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_includes_reason() {
        let err = StoreError::Unavailable("redis down".into());
        assert_eq!(err.to_string(), "store unavailable: redis down");
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_arc_store_shares_state_with_original() {
        let store = Arc::new(MemoryStore::new());
        let handle = Arc::clone(&store);

        handle.store("abc", b"one".to_vec()).await.unwrap();

        assert_eq!(store.fetch("abc").await.unwrap(), Some(b"one".to_vec()));
    }
}
