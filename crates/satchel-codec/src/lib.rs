//! Session data and cookie signing for Satchel.
//!
//! This crate defines what a session IS and how it travels:
//!
//! - **Types** ([`Session`], [`Flash`]): the key/value mapping a handler
//!   reads and writes, plus the one-request flash sub-mapping.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how sessions become
//!   bytes for a store or a cookie.
//! - **Signer** ([`CookieSigner`], [`SecretKey`]): how a stateless
//!   session is packed into a cookie and protected against tampering.
//! - **Errors** ([`CodecError`]): what can go wrong on the way.
//!
//! # Architecture
//!
//! ```text
//! Backend (Session) → Codec (bytes) → Signer (cookie string)
//! ```
//!
//! The signer provides integrity, not confidentiality. Anyone holding the
//! cookie can read the session; only holders of the key can forge one.

mod codec;
mod error;
mod signer;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::CodecError;
pub use signer::{CookieSigner, SecretKey, COOKIE_SEPARATOR, MAX_COOKIE_PAYLOAD};
pub use types::{Flash, Session, FLASH_KEY, SESSION_ID_KEY};
