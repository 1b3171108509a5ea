//! What the middleware attaches to requests, and what handlers attach to
//! responses.
//!
//! Both travel in `http` extensions, the type-keyed slot every
//! `Request`/`Response` carries for exactly this kind of per-message
//! metadata.

use http::{Request, Response};
use satchel_codec::{Flash, Session};

/// The session state of one request, as seen by the handler.
///
/// Inserted into the request's extensions by the middleware before the
/// handler runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// The resolved session, without its flash.
    pub session: Session,

    /// Flash values set by the previous request. Empty if none.
    pub flash: Flash,

    /// `true` if no valid session cookie came in and `session` was just
    /// created.
    pub is_new: bool,
}

/// A handler's instruction about the session, attached to its response.
///
/// A response without one keeps the session as it was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Replace the session with this one and persist it.
    Replace(Session),

    /// Destroy the session and clear the client's cookie.
    Destroy,
}

impl SessionUpdate {
    /// Returns the replacement session, if this is a `Replace`.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Replace(session) => Some(session),
            Self::Destroy => None,
        }
    }
}

/// Session accessors for requests that went through the middleware.
///
/// All of them return "nothing" for requests that did not.
pub trait SessionRequestExt {
    /// The full session context.
    fn session_context(&self) -> Option<&SessionContext>;

    /// The resolved session.
    fn session(&self) -> Option<&Session> {
        self.session_context().map(|ctx| &ctx.session)
    }

    /// Flash values delivered to this request.
    fn flash(&self) -> Option<&Flash> {
        self.session_context().map(|ctx| &ctx.flash)
    }

    /// Whether the session was created for this request.
    fn is_new_session(&self) -> bool {
        self.session_context().is_some_and(|ctx| ctx.is_new)
    }
}

impl<B> SessionRequestExt for Request<B> {
    fn session_context(&self) -> Option<&SessionContext> {
        self.extensions().get::<SessionContext>()
    }
}

/// Attaches a [`SessionUpdate`] to a response.
pub trait SessionResponseExt {
    /// Sets the update in place. A later call replaces an earlier one.
    fn set_session_update(&mut self, update: SessionUpdate);

    /// Builder-style variant of [`set_session_update`](Self::set_session_update).
    fn with_session_update(mut self, update: SessionUpdate) -> Self
    where
        Self: Sized,
    {
        self.set_session_update(update);
        self
    }
}

impl<B> SessionResponseExt for Response<B> {
    fn set_session_update(&mut self, update: SessionUpdate) {
        self.extensions_mut().insert(update);
    }
}
