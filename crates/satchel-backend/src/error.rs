//! Error types for the backend layer.

use satchel_codec::CodecError;
use satchel_store::StoreError;

/// Errors that can occur while resolving or driving a backend.
///
/// A session that can't be found, or a cookie that fails verification,
/// is NOT an error. Backends report those as `Ok(None)` from
/// [`Backend::read`](crate::Backend::read) and the middleware starts a
/// fresh session.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The underlying key-value store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encoding a session failed, or a signed cookie would be too large.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// No backend is registered under this tag.
    ///
    /// Raised when the middleware is built, never per request.
    #[error("no session backend registered under tag {0:?}")]
    Unregistered(String),

    /// A backend is already registered under this tag.
    #[error("session backend tag {0:?} is already registered")]
    DuplicateTag(String),

    /// A server-side backend was asked to persist a session with no id.
    #[error("session has no id to store it under")]
    MissingId,
}
