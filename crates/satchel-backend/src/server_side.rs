//! Server-side backend: sessions in a key-value store, id in the cookie.

use async_trait::async_trait;
use satchel_codec::{Codec, JsonCodec, Session};
use satchel_store::KeyValueStore;
use uuid::Uuid;

use crate::{Backend, BackendError};

/// A [`Backend`] that keeps sessions in a [`KeyValueStore`].
///
/// The cookie carries only the session id, a random UUIDv4. The session
/// itself is encoded with a [`Codec`] (JSON by default) and stored under
/// that id.
///
/// Two requests from the same client that both write race at the store;
/// whichever writes last wins.
#[derive(Debug)]
pub struct StoreBackend<S: KeyValueStore, C: Codec = JsonCodec> {
    store: S,
    codec: C,
}

impl<S: KeyValueStore> StoreBackend<S, JsonCodec> {
    /// Creates a backend over `store` that encodes sessions as JSON.
    pub fn new(store: S) -> Self {
        Self::with_codec(store, JsonCodec)
    }
}

impl<S: KeyValueStore, C: Codec> StoreBackend<S, C> {
    /// Creates a backend with a custom session codec.
    pub fn with_codec(store: S, codec: C) -> Self {
        Self { store, codec }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: KeyValueStore, C: Codec> Backend for StoreBackend<S, C> {
    fn create(&self) -> Session {
        Session::with_id(Uuid::new_v4().to_string())
    }

    async fn read(&self, data: &str) -> Result<Option<Session>, BackendError> {
        let Some(bytes) = self.store.fetch(data).await? else {
            tracing::debug!(session_id = data, "session id not found in store");
            return Ok(None);
        };

        // Corrupt entries are treated like missing ones; the client gets
        // a fresh session instead of a hard failure on every request.
        match self.codec.decode::<Session>(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    session_id = data,
                    error = %e,
                    "stored session failed to decode"
                );
                Ok(None)
            }
        }
    }

    async fn write(&self, session: &Session) -> Result<(), BackendError> {
        let id = session.id().ok_or(BackendError::MissingId)?;
        let bytes = self.codec.encode(session)?;
        self.store.store(id, bytes).await?;
        tracing::debug!(session_id = id, "session written to store");
        Ok(())
    }

    async fn destroy(&self, session: &Session) -> Result<(), BackendError> {
        if let Some(id) = session.id() {
            self.store.delete(id).await?;
            tracing::debug!(session_id = id, "session deleted from store");
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
