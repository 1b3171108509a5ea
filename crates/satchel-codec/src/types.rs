//! Session data types.
//!
//! A session is just a mapping from string keys to JSON values. Two keys
//! are reserved:
//!
//! - `id`: the opaque token a server-side backend stores the session
//!   under. Stateless sessions don't carry one.
//! - `flash`: a nested mapping meant for exactly ONE later request. The
//!   middleware lifts it out before the handler runs, so handlers never
//!   see a stale flash inside the session.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved key holding a server-side session's id.
pub const SESSION_ID_KEY: &str = "id";

/// Reserved key holding the flash mapping.
pub const FLASH_KEY: &str = "flash";

/// Values that survive exactly one request after the one that set them.
///
/// Typical use: "Your changes were saved" after a POST-redirect-GET.
pub type Flash = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A per-client session: string keys mapped to arbitrary JSON values.
///
/// `BTreeMap` (not `HashMap`) keeps keys sorted, so two sessions with the
/// same contents always serialize to the same bytes regardless of the
/// order keys were inserted in. The cookie signature depends on that.
///
/// `#[serde(transparent)]` makes a `Session` serialize as a plain JSON
/// object, e.g. `{"id":"…","user":"alice"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(BTreeMap<String, Value>);

impl Session {
    /// Creates an empty session (what stateless backends start from).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session holding only the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let id: String = id.into();
        let mut session = Self::new();
        session.insert(SESSION_ID_KEY, id);
        session
    }

    /// Returns the session id, if this session has a string one.
    pub fn id(&self) -> Option<&str> {
        self.0.get(SESSION_ID_KEY).and_then(Value::as_str)
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` deserialized as `T`.
    ///
    /// `None` if the key is missing OR the value has a different shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| T::deserialize(v).ok())
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Removes the flash mapping from the session and returns it.
    ///
    /// A missing flash yields an empty one. So does a `flash` entry that
    /// isn't a JSON object; it is dropped either way, since nothing can
    /// read a malformed flash.
    pub fn take_flash(&mut self) -> Flash {
        match self.0.remove(FLASH_KEY) {
            Some(Value::Object(map)) => map.into_iter().collect(),
            _ => Flash::new(),
        }
    }

    /// Merges `entries` into the flash mapping, creating it if needed.
    ///
    /// Existing flash keys not named in `entries` are kept.
    pub fn merge_flash<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let slot = self
            .0
            .entry(FLASH_KEY.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = slot {
            for (k, v) in entries {
                map.insert(k.into(), v.into());
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Session {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Session {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =========================================================================
// Tests
// =========================================================================
