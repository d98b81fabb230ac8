// SPDX-License-Identifier: MIT

//! Per-instance state store. The only part of an instance that survives
//! reload and snapshot; every other instance attribute is transient and
//! reconstructed from the blueprint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed value held in a `StateStore`. `Blob` is for small opaque byte
/// payloads — not meant for large binary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum StateValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Timestamp(u64),
    Blob(Vec<u8>),
}

impl StateValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<u64> {
        match self {
            StateValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            StateValue::Blob(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// A keyed map of typed values attached to a single instance. Deterministic
/// iteration order (`BTreeMap`) so snapshot serialisation is stable, which
/// in turn makes `snapshot ∘ restore ∘ snapshot = snapshot` checkable
/// byte-for-byte in tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStore(BTreeMap<String, StateValue>);

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: StateValue) {
        self.0.insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
