//! Stateless backend: the whole session lives in a signed cookie.

use async_trait::async_trait;
use satchel_codec::{Codec, CookieSigner, JsonCodec, Session};

use crate::{Backend, BackendError};

/// A [`Backend`] that stores nothing server-side.
///
/// The session is serialized, signed, and written into the cookie on
/// every response. `write` and `destroy` have nothing to do; the outbound
/// cookie IS the write.
///
/// Payloads are signed, not encrypted: clients can read their session
/// but can't change it without the key.
#[derive(Debug, Clone)]
pub struct CookieBackend<C: Codec = JsonCodec> {
    signer: CookieSigner<C>,
}

impl<C: Codec> CookieBackend<C> {
    /// Creates a backend that signs cookies with `signer`.
    pub fn new(signer: CookieSigner<C>) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl<C: Codec> Backend for CookieBackend<C> {
    fn create(&self) -> Session {
        Session::new()
    }

    async fn read(&self, data: &str) -> Result<Option<Session>, BackendError> {
        Ok(self.signer.verify_cookie(data))
    }

    async fn write(&self, _session: &Session) -> Result<(), BackendError> {
        Ok(())
    }

    async fn destroy(&self, _session: &Session) -> Result<(), BackendError> {
        Ok(())
    }

    /// Always returns the signed session, so the cookie tracks every
    /// change.
    ///
    /// # Errors
    /// [`CodecError::Overflow`](satchel_codec::CodecError::Overflow) if
    /// the session is too large for a cookie.
    fn cookie_value(
        &self,
        _is_new: bool,
        session: &Session,
    ) -> Result<Option<String>, BackendError> {
        Ok(Some(self.signer.build_cookie(session)?))
    }
}

#[cfg(test)]
mod tests {
    use satchel_codec::{CodecError, SecretKey};

    use super::*;

    fn backend() -> CookieBackend {
        CookieBackend::new(CookieSigner::new(SecretKey::generate()))
    }

    #[test]
    fn test_create_returns_empty_session() {
        assert!(backend().create().is_empty());
    }

    #[tokio::test]
    async fn test_cookie_value_then_read_round_trips() {
        let b = backend();
        let session = Session::from_iter([("user", "alice")]);

        let cookie = b.cookie_value(false, &session).unwrap().unwrap();
        let loaded = b.read(&cookie).await.unwrap();

        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_read_tampered_cookie_returns_none() {
        let b = backend();
        let cookie = b
            .cookie_value(true, &Session::from_iter([("admin", false)]))
            .unwrap()
            .unwrap();
        let tampered = format!("Z{}", &cookie[1..]);

        assert_eq!(b.read(&tampered).await.unwrap(), None);
    }

    #[test]
    fn test_cookie_value_ignores_is_new() {
        // Unlike id-based backends, the cookie is rewritten every time.
        let b = backend();
        let session = Session::from_iter([("n", 1)]);

        assert!(b.cookie_value(false, &session).unwrap().is_some());
        assert!(b.cookie_value(true, &session).unwrap().is_some());
    }

    #[test]
    fn test_cookie_value_oversized_returns_codec_overflow() {
        let b = backend();
        let session = Session::from_iter([("blob", "y".repeat(5000))]);

        let result = b.cookie_value(false, &session);

        assert!(matches!(
            result,
            Err(BackendError::Codec(CodecError::Overflow { .. }))
        ));
    }

    #[tokio::test]
    async fn test_write_and_destroy_are_noops() {
        let b = backend();
        let session = Session::from_iter([("user", "alice")]);

        b.write(&session).await.unwrap();
        b.destroy(&session).await.unwrap();
    }
}
