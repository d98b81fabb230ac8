// SPDX-License-Identifier: MIT

//! Live instance record. Deliberately holds no wasmtime type: every
//! safe-invoker call re-instantiates a fresh `Store` from the
//! blueprint's `Module` and this instance's persisted state (see
//! `manager.rs`), so nothing here needs to be `Send`-audited beyond plain
//! data, and nothing here can leak a reference into the shared world-state
//! critical section across an `.await` point.

use std::time::Instant;

use jit_core::{BlueprintId, Capabilities, ObjectId, StateStore};

#[derive(Debug, Clone)]
pub struct Instance {
    pub object_id: ObjectId,
    pub blueprint_id: BlueprintId,
    pub created_at: Instant,
    pub capabilities: Capabilities,
    /// The only part of an instance that survives reload and snapshot.
    pub state: StateStore,
}
