//! # Satchel
//!
//! Pluggable HTTP session middleware.
//!
//! Satchel wraps a request handler and gives it a per-client
//! [`Session`]: resolved from a cookie on the way in, persisted on the way
//! out. It also supports *flash* values, which survive exactly one
//! request after the one that set them.
//!
//! Two backends ship built in:
//!
//! - `"cookie"` (default): stateless. The whole session is signed with
//!   HMAC-SHA256 and carried in the cookie. Nothing is stored server-side.
//! - `"store"`: server-side. The session lives in a
//!   [`KeyValueStore`](satchel_store::KeyValueStore); the cookie carries
//!   only a random id.
//!
//! More can be registered under new tags without touching the middleware.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Request, Response};
//! use satchel::prelude::*;
//!
//! # async fn run() -> Result<(), SatchelError> {
//! let app = SessionMiddleware::builder()
//!     .secret_key(SecretKey::from_bytes(b"a long, persisted, shared secret key!".to_vec())?)
//!     .build(handler_fn(|req: Request<()>| async move {
//!         let session = req.session().cloned().unwrap_or_default();
//!         let visits = session.get_as::<u64>("visits").unwrap_or(0) + 1;
//!         let update = session_assoc(&session, [("visits", visits)]);
//!         Some(Response::new(format!("visit #{visits}")).with_session_update(update))
//!     }))?;
//!
//! let response = app.call(Request::new(())).await?.expect("handled");
//! assert!(response.headers().contains_key("set-cookie"));
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod error;
mod handler;
mod helpers;
mod middleware;

pub use config::{SessionConfig, DEFAULT_COOKIE_NAME};
pub use context::{SessionContext, SessionRequestExt, SessionResponseExt, SessionUpdate};
pub use error::SatchelError;
pub use handler::{handler_fn, Handler, HandlerFn};
pub use helpers::{
    alter_session, destroy_session, flash_assoc, session_assoc, session_dissoc,
    set_session,
};
pub use middleware::{SessionMiddleware, SessionMiddlewareBuilder};

pub use satchel_backend::{Backend, BackendError, BackendRegistry, COOKIE_BACKEND, STORE_BACKEND};
pub use satchel_codec::{CodecError, Flash, SecretKey, Session};
pub use satchel_store::{KeyValueStore, StoreError};

/// Everything a typical application needs, in one import.
pub mod prelude {
    pub use crate::{
        alter_session, destroy_session, flash_assoc, handler_fn, session_assoc,
        session_dissoc, set_session, Flash, Handler, SatchelError, SecretKey, Session,
        SessionConfig, SessionContext, SessionMiddleware, SessionRequestExt,
        SessionResponseExt, SessionUpdate,
    };
}
