//! Signed-cookie packing for stateless sessions.
//!
//! A stateless session travels entirely inside its cookie:
//!
//! ```text
//! base64(json(session)) -- base64(hmac_sha256(key, base64(json(session))))
//! └──────── payload ──────┘  └────────────────── digest ──────────────────┘
//! ```
//!
//! Both halves use the standard base64 alphabet without padding. That
//! alphabet has no `-`, so the `--` separator can only ever appear once,
//! between payload and digest, and splitting on it is unambiguous.

use std::fmt;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::{Codec, CodecError, JsonCodec, Session};

type HmacSha256 = Hmac<Sha256>;

/// Separator between the payload and the digest in a signed cookie.
pub const COOKIE_SEPARATOR: &str = "--";

/// Largest encoded payload (in bytes) a signed cookie may carry.
///
/// Browsers reject cookies over roughly 4096 bytes including name and
/// attributes, so the payload gets a little less than that.
pub const MAX_COOKIE_PAYLOAD: usize = 4000;

/// Recommended minimum key length for HMAC-SHA256.
const MIN_KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// The key used to sign and verify session cookies.
///
/// Every server instance that should accept a cookie must hold the same
/// key. A generated key lives only as long as the process: restart it and
/// every outstanding cookie stops verifying.
///
/// `Debug` never prints the key bytes.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wraps caller-supplied key material.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidKey`] if `bytes` is empty. Keys
    /// shorter than 32 bytes are accepted but logged as weak.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, CodecError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CodecError::InvalidKey("key must not be empty".into()));
        }
        if bytes.len() < MIN_KEY_LEN {
            tracing::warn!(
                len = bytes.len(),
                recommended = MIN_KEY_LEN,
                "session secret key is shorter than recommended"
            );
        }
        Ok(Self(bytes))
    }

    /// Generates a random 32-byte key (256 bits of entropy).
    pub fn generate() -> Self {
        let bytes: [u8; MIN_KEY_LEN] = rand::rng().random();
        Self(bytes.to_vec())
    }

    /// Returns the raw key material.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// CookieSigner
// ---------------------------------------------------------------------------

/// Packs sessions into signed cookie values and verifies them on the way
/// back in.
///
/// ## Example
///
/// ```rust
/// use satchel_codec::{CookieSigner, SecretKey, Session};
///
/// let signer = CookieSigner::new(SecretKey::generate());
/// let session = Session::from_iter([("user", "alice")]);
///
/// let cookie = signer.build_cookie(&session).unwrap();
/// assert_eq!(signer.verify_cookie(&cookie), Some(session));
///
/// // Any edit breaks the signature.
/// let forged = format!("X{}", &cookie[1..]);
/// assert_eq!(signer.verify_cookie(&forged), None);
/// ```
#[derive(Debug, Clone)]
pub struct CookieSigner<C: Codec = JsonCodec> {
    key: SecretKey,
    codec: C,
}

impl CookieSigner<JsonCodec> {
    /// Creates a signer that serializes sessions as JSON.
    pub fn new(key: SecretKey) -> Self {
        Self::with_codec(key, JsonCodec)
    }
}

impl<C: Codec> CookieSigner<C> {
    /// Creates a signer with a custom session codec.
    pub fn with_codec(key: SecretKey, codec: C) -> Self {
        Self { key, codec }
    }

    /// Computes the base64 HMAC-SHA256 digest of `payload`.
    pub fn sign(&self, payload: &str) -> Result<String, CodecError> {
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        Ok(STANDARD_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Serializes a session into the cookie-safe payload form.
    pub fn marshal(&self, session: &Session) -> Result<String, CodecError> {
        let bytes = self.codec.encode(session)?;
        Ok(STANDARD_NO_PAD.encode(bytes))
    }

    /// Inverse of [`marshal`](Self::marshal).
    pub fn unmarshal(&self, payload: &str) -> Result<Session, CodecError> {
        let bytes = STANDARD_NO_PAD.decode(payload)?;
        self.codec.decode(&bytes)
    }

    /// Builds the full `payload--digest` cookie value for a session.
    ///
    /// # Errors
    /// Returns [`CodecError::Overflow`] if the payload exceeds
    /// [`MAX_COOKIE_PAYLOAD`]. Nothing is truncated.
    pub fn build_cookie(&self, session: &Session) -> Result<String, CodecError> {
        let payload = self.marshal(session)?;
        if payload.len() > MAX_COOKIE_PAYLOAD {
            return Err(CodecError::Overflow {
                size: payload.len(),
                limit: MAX_COOKIE_PAYLOAD,
            });
        }
        let digest = self.sign(&payload)?;
        Ok(format!("{payload}{COOKIE_SEPARATOR}{digest}"))
    }

    /// Verifies a cookie value and returns the session it carries.
    ///
    /// Returns `None` for anything that doesn't check out: missing
    /// separator, undecodable digest, wrong signature, or a payload that
    /// signs correctly but doesn't decode. None of these are errors; a
    /// bad cookie is simply no cookie.
    ///
    /// The digest comparison is constant-time.
    pub fn verify_cookie(&self, cookie: &str) -> Option<Session> {
        let Some((payload, digest)) = cookie.split_once(COOKIE_SEPARATOR)
        else {
            tracing::debug!("session cookie has no separator");
            return None;
        };

        let Ok(received) = STANDARD_NO_PAD.decode(digest) else {
            tracing::debug!("session cookie digest is not base64");
            return None;
        };

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        if mac.verify_slice(&received).is_err() {
            tracing::debug!("session cookie signature mismatch");
            return None;
        }

        match self.unmarshal(payload) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "signed session cookie failed to decode");
                None
            }
        }
    }

    fn mac(&self) -> Result<HmacSha256, CodecError> {
        HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|e| CodecError::InvalidKey(e.to_string()))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn signer() -> CookieSigner {
        CookieSigner::new(
            SecretKey::from_bytes(b"0123456789abcdef0123456789abcdef".to_vec())
                .unwrap(),
        )
    }

    fn sample() -> Session {
        Session::from_iter([
            ("user", json!("alice")),
            ("roles", json!(["admin", "dev"])),
            ("visits", json!(3)),
        ])
    }

    // =====================================================================
    // SecretKey
    // =====================================================================

    #[test]
    fn test_secret_key_empty_returns_invalid_key() {
        let result = SecretKey::from_bytes(Vec::new());

        assert!(matches!(result, Err(CodecError::InvalidKey(_))));
    }

    #[test]
    fn test_secret_key_short_is_accepted() {
        let key = SecretKey::from_bytes(b"short".to_vec()).unwrap();

        assert_eq!(key.as_bytes(), b"short");
    }

    #[test]
    fn test_secret_key_generate_is_random() {
        let a = SecretKey::generate();
        let b = SecretKey::generate();

        assert_eq!(a.as_bytes().len(), 32);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_secret_key_debug_redacts_bytes() {
        let key = SecretKey::from_bytes(b"hunter2hunter2".to_vec()).unwrap();

        let printed = format!("{key:?}");

        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("redacted"));
    }

    // =====================================================================
    // sign()
    // =====================================================================

    #[test]
    fn test_sign_is_deterministic() {
        let s = signer();

        assert_eq!(s.sign("payload").unwrap(), s.sign("payload").unwrap());
    }

    #[test]
    fn test_sign_depends_on_key() {
        let other = CookieSigner::new(SecretKey::generate());

        assert_ne!(signer().sign("payload").unwrap(), other.sign("payload").unwrap());
    }

    // =====================================================================
    // build_cookie() / verify_cookie()
    // =====================================================================

    #[test]
    fn test_build_then_verify_returns_same_session() {
        let s = signer();
        let session = sample();

        let cookie = s.build_cookie(&session).unwrap();

        assert_eq!(s.verify_cookie(&cookie), Some(session));
    }

    #[test]
    fn test_build_cookie_empty_session_verifies() {
        let s = signer();

        let cookie = s.build_cookie(&Session::new()).unwrap();

        assert_eq!(s.verify_cookie(&cookie), Some(Session::new()));
    }

    #[test]
    fn test_build_cookie_separator_appears_once() {
        // Session content containing the separator must not leak it into
        // the payload, or splitting would become ambiguous.
        let s = signer();
        let session = Session::from_iter([("note", "a--b----c")]);

        let cookie = s.build_cookie(&session).unwrap();

        assert_eq!(cookie.matches(COOKIE_SEPARATOR).count(), 1);
        assert_eq!(s.verify_cookie(&cookie), Some(session));
    }

    #[test]
    fn test_verify_cookie_every_single_byte_mutation_rejected() {
        let s = signer();
        let cookie = s.build_cookie(&sample()).unwrap();

        for i in 0..cookie.len() {
            let mut bytes = cookie.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(bytes).unwrap();

            assert_eq!(
                s.verify_cookie(&mutated),
                None,
                "mutation at byte {i} was accepted"
            );
        }
    }

    #[test]
    fn test_verify_cookie_wrong_key_returns_none() {
        let cookie = signer().build_cookie(&sample()).unwrap();
        let other = CookieSigner::new(SecretKey::generate());

        assert_eq!(other.verify_cookie(&cookie), None);
    }

    #[test]
    fn test_verify_cookie_without_separator_returns_none() {
        assert_eq!(signer().verify_cookie("justsomegarbage"), None);
    }

    #[test]
    fn test_verify_cookie_empty_string_returns_none() {
        assert_eq!(signer().verify_cookie(""), None);
    }

    #[test]
    fn test_verify_cookie_signed_garbage_payload_returns_none() {
        // Correctly signed, but the payload isn't a session.
        let s = signer();
        let payload = STANDARD_NO_PAD.encode(b"[1,2,3]");
        let cookie = format!("{payload}--{}", s.sign(&payload).unwrap());

        assert_eq!(s.verify_cookie(&cookie), None);
    }

    #[test]
    fn test_build_cookie_oversized_returns_overflow() {
        let s = signer();
        let session = Session::from_iter([("blob", "x".repeat(4000))]);

        let result = s.build_cookie(&session);

        match result {
            Err(CodecError::Overflow { size, limit }) => {
                assert!(size > limit);
                assert_eq!(limit, MAX_COOKIE_PAYLOAD);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_build_cookie_just_under_limit_succeeds() {
        // 2900 chars of JSON string base64-encodes to well under 4000.
        let s = signer();
        let session = Session::from_iter([("blob", "x".repeat(2900))]);

        let cookie = s.build_cookie(&session).unwrap();

        assert!(s.marshal(&session).unwrap().len() <= MAX_COOKIE_PAYLOAD);
        assert_eq!(s.verify_cookie(&cookie), Some(session));
    }

    /// `{"b":"…"}` is 8 bytes of JSON around the blob.
    fn session_with_json_len(json_len: usize) -> Session {
        Session::from_iter([("b", "x".repeat(json_len - 8))])
    }

    #[test]
    fn test_build_cookie_payload_at_limit_succeeds() {
        // 3000 JSON bytes encode to exactly 4000 base64 characters.
        let s = signer();
        let session = session_with_json_len(3000);

        assert_eq!(s.marshal(&session).unwrap().len(), MAX_COOKIE_PAYLOAD);
        let cookie = s.build_cookie(&session).unwrap();
        assert_eq!(s.verify_cookie(&cookie), Some(session));
    }

    #[test]
    fn test_build_cookie_payload_one_step_over_limit_returns_overflow() {
        // Unpadded base64 never has length 4n + 1, so 4002 is the first
        // payload size past the limit.
        let s = signer();
        let session = session_with_json_len(3001);

        assert_eq!(s.marshal(&session).unwrap().len(), MAX_COOKIE_PAYLOAD + 2);
        assert!(matches!(
            s.build_cookie(&session),
            Err(CodecError::Overflow { size, limit })
                if size == MAX_COOKIE_PAYLOAD + 2 && limit == MAX_COOKIE_PAYLOAD
        ));
    }

    #[test]
    fn test_unmarshal_invalid_base64_returns_base64_error() {
        let result = signer().unmarshal("not base64!");

        assert!(matches!(result, Err(CodecError::Base64(_))));
    }
}
