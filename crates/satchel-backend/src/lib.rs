//! Session backends for Satchel.
//!
//! A backend decides where a session lives between requests. Every
//! backend answers the same five questions ([`Backend`] trait):
//!
//! 1. **create**: what does a brand-new session look like?
//! 2. **read**: given the cookie value, which session is this?
//! 3. **write**: persist this session.
//! 4. **destroy**: forget this session.
//! 5. **cookie_value**: what (if anything) goes into the cookie now?
//!
//! Two backends ship built in:
//!
//! - [`StoreBackend`]: session in a [`KeyValueStore`](satchel_store::KeyValueStore),
//!   cookie holds only the id.
//! - [`CookieBackend`]: whole session signed into the cookie, nothing
//!   stored server-side.
//!
//! The [`BackendRegistry`] maps string tags to backends, so the
//! middleware can be pointed at one by configuration and hosts can add
//! their own without touching the middleware.
//!
//! # How it fits in the stack
//!
//! ```text
//! Middleware (above)  ← picks one backend per instance, drives lifecycle
//!     ↕
//! Backend Layer (this crate)  ← create / read / write / destroy / cookie
//!     ↕
//! Codec + Store (below)  ← bytes, signatures, key-value storage
//! ```

mod backend;
mod cookie;
mod error;
mod registry;
mod server_side;

pub use backend::Backend;
pub use cookie::CookieBackend;
pub use error::BackendError;
pub use registry::{BackendRegistry, COOKIE_BACKEND, STORE_BACKEND};
pub use server_side::StoreBackend;
