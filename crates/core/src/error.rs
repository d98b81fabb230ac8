// SPDX-License-Identifier: MIT

//! Errors shared by every crate: per-crate `thiserror` enums, never a
//! bare `String`/`Box<dyn Error>` at a public API surface.

use thiserror::Error;

use crate::id::ObjectId;

/// Containment-graph mutation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainmentError {
    #[error("{child} has no container")]
    NotContained { child: ObjectId },
    #[error("moving {child} into {target} would create a containment cycle")]
    Cycle { child: ObjectId, target: ObjectId },
    #[error("{item} is not contained by {wearer}")]
    NotCarriedByWearer { wearer: ObjectId, item: ObjectId },
    #[error("slot {slot:?} on {wearer} is already occupied")]
    SlotOccupied { wearer: ObjectId, slot: String },
    #[error("slot {slot:?} on {wearer} is empty")]
    SlotEmpty { wearer: ObjectId, slot: String },
}
