//! Codec trait and implementations for serializing sessions.
//!
//! A "codec" (coder/decoder) converts between Rust values and raw bytes.
//! The server-side backend uses one to turn a [`Session`](crate::Session)
//! into bytes for the store; the cookie signer uses one to build the
//! cookie payload. Neither cares HOW the bytes are produced, only that
//! `decode(encode(x)) == x`.

use serde::{de::DeserializeOwned, Serialize};

use crate::CodecError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → backends holding a codec are shared across request
///   tasks.
/// - `'static` → the codec owns everything it needs.
/// - `Clone` → each backend keeps its own copy; codecs are expected to be
///   cheap (usually zero-sized).
pub trait Codec: Clone + Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `CodecError::Encode` if the value can't be represented in
    /// this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `CodecError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Sessions are already JSON-shaped (string keys, `serde_json::Value`
/// values), so JSON round-trips them exactly.
///
/// ## Example
///
/// ```rust
/// use satchel_codec::{Codec, JsonCodec, Session};
///
/// let codec = JsonCodec;
/// let session = Session::from_iter([("user", "alice")]);
///
/// let bytes = codec.encode(&session).unwrap();
/// let decoded: Session = codec.decode(&bytes).unwrap();
/// assert_eq!(session, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(data).map_err(CodecError::Decode)
    }
}
