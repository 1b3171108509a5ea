//! Session middleware configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "satchel-session";

/// Configuration for the session middleware.
///
/// Every field has a default, so a config file only needs to name what
/// it changes. `#[serde(default)]` fills the rest from
/// [`SessionConfig::default()`].
///
/// ```rust
/// use satchel::SessionConfig;
///
/// let config = SessionConfig {
///     backend: "store".into(),
///     ..SessionConfig::default()
/// };
/// assert_eq!(config.cookie_path, "/");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tag of the backend to use. Must be registered by the time the
    /// middleware is built.
    ///
    /// Default: `"cookie"` (stateless signed cookies).
    pub backend: String,

    /// Key for signing stateless session cookies.
    ///
    /// Default: `None`, meaning a random key is generated when the
    /// middleware is built. That is fine for development and wrong for
    /// production: the key dies with the process, so every restart logs
    /// every user out, and separate instances reject each other's cookies.
    ///
    /// Read from config files but never written back out.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,

    /// Name of the session cookie.
    ///
    /// Default: `"satchel-session"`.
    pub cookie_name: String,

    /// `Path` attribute of the session cookie.
    ///
    /// Default: `"/"`.
    pub cookie_path: String,

    /// Whether the cookie is hidden from client-side scripts.
    ///
    /// Default: `true`.
    pub http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: satchel_backend::COOKIE_BACKEND.to_string(),
            secret_key: None,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: "/".to_string(),
            http_only: true,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("backend", &self.backend)
            .field(
                "secret_key",
                &self.secret_key.as_ref().map(|_| "<redacted>"),
            )
            .field("cookie_name", &self.cookie_name)
            .field("cookie_path", &self.cookie_path)
            .field("http_only", &self.http_only)
            .finish()
    }
}
