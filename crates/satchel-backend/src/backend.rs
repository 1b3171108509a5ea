//! The backend contract.

use async_trait::async_trait;
use satchel_codec::Session;

use crate::BackendError;

/// Where sessions live between requests.
///
/// Implement this to add a backend (Redis, a database table, an
/// encrypted cookie…) and register it in a
/// [`BackendRegistry`](crate::BackendRegistry). The middleware only ever
/// talks to backends through this trait.
///
/// `#[async_trait]` (rather than a plain `async fn`) keeps the trait
/// object-safe, so a registry can hold `Arc<dyn Backend>` values of
/// different concrete types side by side.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use satchel_backend::{Backend, BackendError};
/// use satchel_codec::Session;
///
/// /// Every request gets the same read-only guest session.
/// struct GuestBackend;
///
/// #[async_trait]
/// impl Backend for GuestBackend {
///     fn create(&self) -> Session {
///         Session::from_iter([("user", "guest")])
///     }
///
///     async fn read(&self, _data: &str) -> Result<Option<Session>, BackendError> {
///         Ok(Some(self.create()))
///     }
///
///     async fn write(&self, _session: &Session) -> Result<(), BackendError> {
///         Ok(())
///     }
///
///     async fn destroy(&self, _session: &Session) -> Result<(), BackendError> {
///         Ok(())
///     }
///
///     fn cookie_value(
///         &self,
///         is_new: bool,
///         _session: &Session,
///     ) -> Result<Option<String>, BackendError> {
///         Ok(is_new.then(|| "guest".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Returns a fresh session.
    ///
    /// Must not touch storage: a new session is only persisted if the
    /// middleware later decides to write it.
    fn create(&self) -> Session;

    /// Resolves the session named by a cookie value.
    ///
    /// `data` is whatever [`cookie_value`](Self::cookie_value) produced
    /// on an earlier response. Returns `Ok(None)` if the session doesn't
    /// exist or the cookie doesn't verify.
    async fn read(&self, data: &str) -> Result<Option<Session>, BackendError>;

    /// Persists a session.
    async fn write(&self, session: &Session) -> Result<(), BackendError>;

    /// Removes a session from wherever it is persisted.
    async fn destroy(&self, session: &Session) -> Result<(), BackendError>;

    /// Computes the value to put in the session cookie, if any.
    ///
    /// `Ok(None)` leaves the client's cookie untouched. The default
    /// suits id-based backends: send the id once, when the session is
    /// new, and never again, since it doesn't change.
    fn cookie_value(
        &self,
        is_new: bool,
        session: &Session,
    ) -> Result<Option<String>, BackendError> {
        if is_new {
            Ok(session.id().map(str::to_owned))
        } else {
            Ok(None)
        }
    }
}
