//! Entity records
//!
//! An [`Entity`] is a key plus a property bag. Properties are held in a
//! sorted map so serialization and comparison are deterministic. The store
//! keeps entities exactly as they arrived; nothing in the bag is
//! reinterpreted after decode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::key::Key;
use crate::value::Value;

/// An entity: a key plus a mapping from property name to typed value.
///
/// Wire shape: `{"key": {...}, "properties": {"name": {"stringValue": ...}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity's key; must be complete before the entity is stored.
    pub key: Key,
    /// Property bag, sorted by property name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    /// Entity with an empty property bag.
    pub fn new(key: Key) -> Self {
        Entity {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property insertion.
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Copy of this entity with all properties stripped (keys-only results).
    pub fn keys_only(&self) -> Entity {
        Entity::new(self.key.clone())
    }

    /// Serialized size in bytes, as counted against the entity size ceiling.
    ///
    /// Entities always serialize; the fallback fails validation closed on
    /// the impossible path rather than panicking.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(usize::MAX)
    }
}
