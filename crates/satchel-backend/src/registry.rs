//! Tag → backend lookup.
//!
//! The registry is an ordinary value, built at startup and handed to the
//! middleware builder. There is no global table: two registries never see
//! each other's entries, and a tag can't be re-pointed once registered.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Backend, BackendError};

/// Tag of the built-in stateless signed-cookie backend.
pub const COOKIE_BACKEND: &str = "cookie";

/// Tag of the built-in server-side store backend.
pub const STORE_BACKEND: &str = "store";

/// Maps backend tags to backend instances.
///
/// `Clone` is cheap: backends are held behind `Arc`.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `backend` under `tag`.
    ///
    /// # Errors
    /// Returns [`BackendError::DuplicateTag`] if the tag is taken.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        backend: impl Backend,
    ) -> Result<(), BackendError> {
        self.register_shared(tag, Arc::new(backend))
    }

    /// Registers an already-shared backend under `tag`.
    pub fn register_shared(
        &mut self,
        tag: impl Into<String>,
        backend: Arc<dyn Backend>,
    ) -> Result<(), BackendError> {
        let tag = tag.into();
        if self.backends.contains_key(&tag) {
            return Err(BackendError::DuplicateTag(tag));
        }
        tracing::debug!(backend = %tag, "session backend registered");
        self.backends.insert(tag, backend);
        Ok(())
    }

    /// Looks up the backend registered under `tag`.
    ///
    /// # Errors
    /// Returns [`BackendError::Unregistered`] for unknown tags.
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn Backend>, BackendError> {
        self.backends
            .get(tag)
            .cloned()
            .ok_or_else(|| BackendError::Unregistered(tag.to_string()))
    }

    /// Returns `true` if a backend is registered under `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.backends.contains_key(tag)
    }

    /// Iterates over registered tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("BackendRegistry").field("tags", &tags).finish()
    }
}

// =========================================================================
// Tests
// =========================================================================
