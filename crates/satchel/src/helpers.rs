//! Response-side session helpers for handler authors.
//!
//! Each helper is pure: it takes the session the handler saw (if it needs
//! one) and returns a [`SessionUpdate`] to attach to the response. No I/O
//! happens until the middleware sees the response.
//!
//! ```rust
//! use http::{Request, Response};
//! use satchel::prelude::*;
//!
//! async fn login(req: Request<()>) -> Option<Response<&'static str>> {
//!     let session = req.session()?;
//!     let update = session_assoc(session, [("user", "alice")]);
//!     Some(Response::new("welcome").with_session_update(update))
//! }
//! ```

use serde_json::Value;

use crate::SessionUpdate;
use satchel_codec::Session;

/// Replaces the session wholesale.
pub fn set_session(session: Session) -> SessionUpdate {
    SessionUpdate::Replace(session)
}

/// Replaces the session with `f(current)`.
///
/// `current` is left untouched; `f` works on a copy.
pub fn alter_session<F>(current: &Session, f: F) -> SessionUpdate
where
    F: FnOnce(Session) -> Session,
{
    SessionUpdate::Replace(f(current.clone()))
}

/// Sets the given keys on a copy of `current`.
pub fn session_assoc<I, K, V>(current: &Session, entries: I) -> SessionUpdate
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    alter_session(current, |mut session| {
        for (k, v) in entries {
            session.insert(k, v);
        }
        session
    })
}

/// Removes the given keys from a copy of `current`.
pub fn session_dissoc<I, K>(current: &Session, keys: I) -> SessionUpdate
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    alter_session(current, |mut session| {
        for k in keys {
            session.remove(k.as_ref());
        }
        session
    })
}

/// Queues flash values for the NEXT request.
///
/// The current request's own flash (already lifted out of `current` by
/// the middleware) is not included.
pub fn flash_assoc<I, K, V>(current: &Session, entries: I) -> SessionUpdate
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    alter_session(current, |mut session| {
        session.merge_flash(entries);
        session
    })
}

/// Destroys the session and clears the client's cookie.
pub fn destroy_session() -> SessionUpdate {
    SessionUpdate::Destroy
}

#[cfg(test)]
mod tests {
    use satchel_codec::FLASH_KEY;
    use serde_json::json;

    use super::*;

    fn current() -> Session {
        Session::from_iter([("id", json!("s1")), ("user", json!("alice"))])
    }

    fn replaced(update: SessionUpdate) -> Session {
        match update {
            SessionUpdate::Replace(session) => session,
            SessionUpdate::Destroy => panic!("expected a replacement"),
        }
    }

    #[test]
    fn test_set_session_carries_session_verbatim() {
        let session = Session::from_iter([("a", 1)]);

        assert_eq!(replaced(set_session(session.clone())), session);
    }

    #[test]
    fn test_alter_session_applies_function_to_copy() {
        let cur = current();

        let update = alter_session(&cur, |mut s| {
            s.insert("visits", 1);
            s
        });

        assert_eq!(replaced(update).get("visits"), Some(&json!(1)));
        assert!(!cur.contains_key("visits"), "original untouched");
    }

    #[test]
    fn test_session_assoc_sets_keys() {
        let session = replaced(session_assoc(&current(), [("user", "bob"), ("role", "admin")]));

        assert_eq!(session.get("user"), Some(&json!("bob")));
        assert_eq!(session.get("role"), Some(&json!("admin")));
        assert_eq!(session.id(), Some("s1"));
    }

    #[test]
    fn test_session_dissoc_removes_keys() {
        let session = replaced(session_dissoc(&current(), ["user", "missing"]));

        assert!(!session.contains_key("user"));
        assert_eq!(session.id(), Some("s1"));
    }

    #[test]
    fn test_flash_assoc_writes_under_flash_key() {
        let session = replaced(flash_assoc(&current(), [("notice", "saved")]));

        assert_eq!(session.get(FLASH_KEY), Some(&json!({"notice": "saved"})));
        assert_eq!(session.get("user"), Some(&json!("alice")));
    }

    #[test]
    fn test_destroy_session_returns_destroy() {
        assert_eq!(destroy_session(), SessionUpdate::Destroy);
    }
}
