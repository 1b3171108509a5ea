//! Unified error type for Satchel.

use satchel_backend::BackendError;
use satchel_codec::CodecError;
use satchel_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// Hosts normally see this from two places:
///
/// - [`SessionMiddlewareBuilder::build`](crate::SessionMiddlewareBuilder::build),
///   for configuration mistakes (unknown backend tag, empty key).
/// - [`SessionMiddleware::call`](crate::SessionMiddleware::call), for
///   per-request failures the host should answer with a server error
///   (store down, session too large for its cookie).
#[derive(Debug, thiserror::Error)]
pub enum SatchelError {
    /// A store-level error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A codec-level error (encoding, signing, key).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A backend-level error (lookup, registry, store, codec).
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The computed cookie could not be put in a `Set-Cookie` header.
    #[error("invalid Set-Cookie header: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

impl SatchelError {
    /// Returns `true` if this error means a session was too large to fit
    /// in its cookie.
    pub fn is_overflow(&self) -> bool {
        matches!(
            self,
            Self::Codec(CodecError::Overflow { .. })
                | Self::Backend(BackendError::Codec(CodecError::Overflow { .. }))
        )
    }
}
