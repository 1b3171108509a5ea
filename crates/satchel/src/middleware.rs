//! The session lifecycle middleware.
//!
//! Each request walks the same path:
//!
//! ```text
//! cookie → resolve session → lift flash → handler → save? → Set-Cookie?
//! ```
//!
//! 1. Read the session cookie, if any.
//! 2. Ask the backend for that session. No cookie, an unknown id, or a
//!    cookie that fails verification all lead to the same place: a fresh
//!    session from `create`, flagged as new.
//! 3. Lift the `flash` entry out of the session. The handler sees it as
//!    [`SessionContext::flash`] and NOT inside the session, so unless the
//!    handler sets a new one, it is gone after this request.
//! 4. Run the handler. `None` means "not handled" and ends the request
//!    here, with no persistence at all.
//! 5. Persist if the handler attached a session, the session is new, or
//!    a flash was delivered (persisting clears it).
//! 6. Ask the backend for a cookie value and, if it has one, append a
//!    `Set-Cookie` header.
//!
//! Nothing here locks anything. Two concurrent requests carrying the same
//! session each resolve, mutate, and persist independently; the later
//! write wins.

use std::sync::Arc;

use cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Request, Response};
use satchel_backend::{
    Backend, BackendRegistry, CookieBackend, StoreBackend, COOKIE_BACKEND,
    STORE_BACKEND,
};
use satchel_codec::{CookieSigner, SecretKey, Session, SESSION_ID_KEY};
use satchel_store::KeyValueStore;

use crate::{Handler, SatchelError, SessionConfig, SessionContext, SessionUpdate};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SessionMiddleware`].
///
/// # Example
///
/// ```rust
/// use http::{Request, Response};
/// use satchel::{handler_fn, SessionConfig, SessionMiddleware};
/// use satchel_store::MemoryStore;
///
/// let middleware = SessionMiddleware::builder()
///     .config(SessionConfig {
///         backend: "store".into(),
///         ..SessionConfig::default()
///     })
///     .store(MemoryStore::new())
///     .build(handler_fn(|_req: Request<()>| async {
///         Some(Response::new(()))
///     }))
///     .expect("store backend is registered");
/// # let _ = middleware;
/// ```
pub struct SessionMiddlewareBuilder {
    config: SessionConfig,
    secret_key: Option<SecretKey>,
    registry: BackendRegistry,
    store_backend: Option<Arc<dyn Backend>>,
    extra: Vec<(String, Arc<dyn Backend>)>,
}

impl SessionMiddlewareBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            secret_key: None,
            registry: BackendRegistry::new(),
            store_backend: None,
            extra: Vec::new(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Selects the backend by tag. Shorthand for setting
    /// [`SessionConfig::backend`].
    pub fn backend(mut self, tag: impl Into<String>) -> Self {
        self.config.backend = tag.into();
        self
    }

    /// Sets the cookie signing key, overriding [`SessionConfig::secret_key`].
    pub fn secret_key(mut self, key: SecretKey) -> Self {
        self.secret_key = Some(key);
        self
    }

    /// Enables the built-in server-side backend (tag `"store"`) over
    /// `store`.
    pub fn store(mut self, store: impl KeyValueStore) -> Self {
        self.store_backend = Some(Arc::new(StoreBackend::new(store)));
        self
    }

    /// Starts from an existing registry instead of an empty one.
    ///
    /// Built-in backends are still added on top; a registry that already
    /// uses a built-in tag makes [`build`](Self::build) fail.
    pub fn registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers an additional backend under `tag`.
    pub fn register(mut self, tag: impl Into<String>, backend: impl Backend) -> Self {
        self.extra.push((tag.into(), Arc::new(backend)));
        self
    }

    /// Builds the middleware around `handler`.
    ///
    /// This is where configuration is checked: the selected backend must
    /// be registered, tags must be unique, and a configured key must be
    /// non-empty.
    ///
    /// # Errors
    /// - [`BackendError::Unregistered`](satchel_backend::BackendError::Unregistered)
    ///   if no backend has the configured tag.
    /// - [`BackendError::DuplicateTag`](satchel_backend::BackendError::DuplicateTag)
    ///   if two backends share a tag.
    /// - [`CodecError::InvalidKey`](satchel_codec::CodecError::InvalidKey)
    ///   if the configured secret key is empty.
    pub fn build<H>(self, handler: H) -> Result<SessionMiddleware<H>, SatchelError> {
        let Self {
            config,
            secret_key,
            mut registry,
            store_backend,
            extra,
        } = self;

        let key = match (secret_key, &config.secret_key) {
            (Some(key), _) => key,
            (None, Some(configured)) => {
                SecretKey::from_bytes(configured.clone().into_bytes())?
            }
            (None, None) => {
                if config.backend == COOKIE_BACKEND {
                    tracing::warn!(
                        "no session secret key configured; generated a \
                         random one. Session cookies will not survive a \
                         restart or verify on other instances"
                    );
                }
                SecretKey::generate()
            }
        };

        registry.register(COOKIE_BACKEND, CookieBackend::new(CookieSigner::new(key)))?;
        if let Some(store_backend) = store_backend {
            registry.register_shared(STORE_BACKEND, store_backend)?;
        }
        for (tag, backend) in extra {
            registry.register_shared(tag, backend)?;
        }

        let backend = registry.resolve(&config.backend)?;
        tracing::info!(
            backend = %config.backend,
            cookie = %config.cookie_name,
            "session middleware ready"
        );

        Ok(SessionMiddleware {
            handler,
            backend,
            config,
        })
    }
}

impl Default for SessionMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// Wraps a [`Handler`] with session resolution and persistence.
///
/// One backend is bound per instance, chosen at build time. The
/// middleware holds no per-request state and can be shared freely (e.g.
/// behind an `Arc`) across request tasks.
pub struct SessionMiddleware<H> {
    handler: H,
    backend: Arc<dyn Backend>,
    config: SessionConfig,
}

impl SessionMiddleware<()> {
    /// Creates a builder. The handler type is fixed later, by
    /// [`SessionMiddlewareBuilder::build`].
    pub fn builder() -> SessionMiddlewareBuilder {
        SessionMiddlewareBuilder::new()
    }
}

impl<H> SessionMiddleware<H> {
    /// The backend this middleware drives.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// The configuration the middleware was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs one request through the session lifecycle and the handler.
    ///
    /// Returns `Ok(None)` when the handler declined the request.
    ///
    /// # Errors
    /// Backend and store failures, and sessions too large for their
    /// cookie ([`SatchelError::is_overflow`]). Hosts should answer these
    /// with a server error. A bad or unknown cookie is NOT an error.
    pub async fn call<ReqBody>(
        &self,
        mut request: Request<ReqBody>,
    ) -> Result<Option<Response<H::ResBody>>, SatchelError>
    where
        H: Handler<ReqBody>,
    {
        // --- Resolve ---
        let resolved = match self.session_cookie(request.headers()) {
            Some(value) => self.backend.read(&value).await?,
            None => None,
        };
        let (mut session, is_new) = match resolved {
            Some(session) => (session, false),
            None => {
                tracing::debug!("starting new session");
                (self.backend.create(), true)
            }
        };

        // --- Lift flash ---
        let flash = session.take_flash();
        let had_flash = !flash.is_empty();

        request.extensions_mut().insert(SessionContext {
            session: session.clone(),
            flash,
            is_new,
        });

        // --- Handler ---
        let Some(mut response) = self.handler.call(request).await else {
            return Ok(None);
        };

        // --- Save ---
        let update = response.extensions_mut().remove::<SessionUpdate>();
        let (effective, replaced) = match update {
            Some(SessionUpdate::Destroy) => {
                self.backend.destroy(&session).await?;
                tracing::debug!(session_id = ?session.id(), "session destroyed");
                self.append_cookie(&mut response, self.removal_cookie())?;
                return Ok(Some(response));
            }
            Some(SessionUpdate::Replace(replacement)) => {
                (carry_id(&session, replacement), true)
            }
            None => (session, false),
        };

        if replaced || is_new || had_flash {
            tracing::debug!(replaced, is_new, had_flash, "persisting session");
            self.backend.write(&effective).await?;
        }

        // --- Cookie ---
        if let Some(value) = self.backend.cookie_value(is_new, &effective)? {
            let cookie = Cookie::build((self.config.cookie_name.clone(), value))
                .path(self.config.cookie_path.clone())
                .http_only(self.config.http_only)
                .build();
            self.append_cookie(&mut response, cookie)?;
        }

        Ok(Some(response))
    }

    /// Finds the session cookie among the request's `Cookie` headers.
    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.config.cookie_name)
            .map(|cookie| cookie.value().to_string())
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.config.cookie_name.clone(), ""))
            .path(self.config.cookie_path.clone())
            .http_only(self.config.http_only)
            .build();
        cookie.make_removal();
        cookie
    }

    fn append_cookie<B>(
        &self,
        response: &mut Response<B>,
        cookie: Cookie<'static>,
    ) -> Result<(), SatchelError> {
        let header = HeaderValue::from_str(&cookie.to_string())?;
        response.headers_mut().append(SET_COOKIE, header);
        tracing::debug!(cookie = %self.config.cookie_name, "session cookie set");
        Ok(())
    }
}

/// Keeps the resolved session's id on a replacement that lacks one.
///
/// Handlers usually build replacements from scratch (`{user: "alice"}`)
/// and shouldn't have to copy the id over by hand. A replacement that
/// sets its own id keeps it.
fn carry_id(resolved: &Session, mut replacement: Session) -> Session {
    if replacement.id().is_none() {
        if let Some(id) = resolved.id() {
            replacement.insert(SESSION_ID_KEY, id);
        }
    }
    replacement
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handler_fn;

    fn noop_middleware() -> SessionMiddleware<impl Handler<(), ResBody = ()>> {
        SessionMiddleware::builder()
            .build(handler_fn(|_req: Request<()>| async { Some(Response::new(())) }))
            .unwrap()
    }

    #[test]
    fn test_carry_id_fills_missing_id() {
        let resolved = Session::with_id("abc");
        let replacement = Session::from_iter([("user", "alice")]);

        let session = carry_id(&resolved, replacement);

        assert_eq!(session.id(), Some("abc"));
        assert_eq!(session.get("user"), Some(&json!("alice")));
    }

    #[test]
    fn test_carry_id_keeps_explicit_id() {
        let resolved = Session::with_id("old");
        let replacement = Session::with_id("new");

        assert_eq!(carry_id(&resolved, replacement).id(), Some("new"));
    }

    #[test]
    fn test_carry_id_stateless_session_stays_id_free() {
        let session = carry_id(&Session::new(), Session::from_iter([("a", 1)]));

        assert_eq!(session.id(), None);
    }

    #[test]
    fn test_session_cookie_found_among_many() {
        let mw = noop_middleware();
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; satchel-session=abc"));

        assert_eq!(mw.session_cookie(&headers), Some("abc".into()));
    }

    #[test]
    fn test_session_cookie_across_multiple_headers() {
        let mw = noop_middleware();
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("satchel-session=xyz"));

        assert_eq!(mw.session_cookie(&headers), Some("xyz".into()));
    }

    #[test]
    fn test_session_cookie_absent_returns_none() {
        let mw = noop_middleware();
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(mw.session_cookie(&headers), None);
        assert_eq!(mw.session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let mw = noop_middleware();

        let cookie = mw.removal_cookie();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[tokio::test]
    async fn test_builder_needs_no_handler_annotation() {
        let mw = SessionMiddleware::builder()
            .build(handler_fn(|_req: Request<()>| async { Some(Response::new("ok")) }))
            .unwrap();

        let response = mw.call(Request::new(())).await.unwrap().unwrap();

        assert_eq!(*response.body(), "ok");
        assert!(response.headers().contains_key(SET_COOKIE));
    }

    #[test]
    fn test_build_unknown_backend_fails() {
        let result = SessionMiddleware::builder()
            .backend("redis")
            .build(handler_fn(|_req: Request<()>| async { Some(Response::new(())) }));

        assert!(matches!(
            result,
            Err(SatchelError::Backend(satchel_backend::BackendError::Unregistered(_)))
        ));
    }

    #[test]
    fn test_build_store_tag_without_store_fails() {
        let result = SessionMiddleware::builder()
            .backend(STORE_BACKEND)
            .build(handler_fn(|_req: Request<()>| async { Some(Response::new(())) }));

        assert!(result.is_err());
    }

    #[test]
    fn test_build_empty_configured_key_fails() {
        let result = SessionMiddleware::builder()
            .config(SessionConfig {
                secret_key: Some(String::new()),
                ..SessionConfig::default()
            })
            .build(handler_fn(|_req: Request<()>| async { Some(Response::new(())) }));

        assert!(matches!(
            result,
            Err(SatchelError::Codec(satchel_codec::CodecError::InvalidKey(_)))
        ));
    }
}
