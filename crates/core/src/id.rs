// SPDX-License-Identifier: MIT

//! Identifier service. `BlueprintId` and `ObjectId` wrap a
//! `SmolStr`/small `Copy` payload rather than a heap `String` so that
//! passing an id around a hot path (ordinal allocation, scheduler lookups)
//! does not allocate. `ObjectId` supports structured access
//! (`blueprint_id()`, `ordinal()`) because the driver routes on those
//! fields constantly, not only on opaque string comparison.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::macros::simple_display;

/// A world source file's stable identity: its path relative to the world
/// root, suffix stripped (e.g. `items/rusty_sword`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlueprintId(SmolStr);

impl BlueprintId {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(SmolStr::new(normalize(path.as_ref())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn normalize(path: &str) -> String {
    path.trim().trim_start_matches('/').replace('\\', "/")
}

simple_display!(BlueprintId, 0);

impl From<&str> for BlueprintId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BlueprintId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for BlueprintId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for BlueprintId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

/// A live instance's identity: `<blueprintId>#<zero-padded ordinal>`.
/// Ordinals are per-blueprint, monotonic, and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    blueprint: BlueprintId,
    ordinal: u32,
}

pub const ORDINAL_WIDTH: usize = 6;

impl ObjectId {
    pub fn new(blueprint: BlueprintId, ordinal: u32) -> Self {
        Self { blueprint, ordinal }
    }

    pub fn blueprint_id(&self) -> &BlueprintId {
        &self.blueprint
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{:0width$}",
            self.blueprint,
            self.ordinal,
            width = ORDINAL_WIDTH
        )
    }
}

/// Error returned when an `ObjectId` fails to parse from its wire form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("malformed object id: {0:?}")]
pub struct ParseObjectIdError(String);

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (blueprint, ordinal) = s
            .rsplit_once('#')
            .ok_or_else(|| ParseObjectIdError(s.to_string()))?;
        let ordinal: u32 = ordinal
            .parse()
            .map_err(|_| ParseObjectIdError(s.to_string()))?;
        if blueprint.is_empty() {
            return Err(ParseObjectIdError(s.to_string()));
        }
        Ok(Self {
            blueprint: BlueprintId::new(blueprint),
            ordinal,
        })
    }
}

/// The player-session pseudo-id: `session:<name>`. Reserved prefix, does not
/// participate in the blueprint/ordinal space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(SmolStr);

impl SessionId {
    pub fn for_player(name: impl AsRef<str>) -> Self {
        Self(SmolStr::new(format!("session:{}", name.as_ref())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

simple_display!(SessionId, 0);
