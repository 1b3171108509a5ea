//! Error types for the codec layer.

/// Errors that can occur while encoding, decoding, or signing sessions.
///
/// Verification failures are NOT in this list. A cookie that fails its
/// signature check is treated as "no cookie" by
/// [`CookieSigner::verify_cookie`](crate::CookieSigner::verify_cookie),
/// so it never becomes an error a request has to handle.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed (turning a session into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a session).
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The cookie payload was not valid base64.
    #[error("malformed cookie payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The signed session would not fit in a cookie.
    ///
    /// Browsers cap cookies at roughly 4 KiB. The session is never
    /// truncated; the request fails instead.
    #[error("session payload is {size} bytes, cookie limit is {limit}")]
    Overflow { size: usize, limit: usize },

    /// The secret key cannot be used for signing.
    #[error("invalid secret key: {0}")]
    InvalidKey(String),
}
