// SPDX-License-Identifier: MIT

//! Persistence: atomic file writes, world snapshots, orphaned
//! in-progress markers, and per-player account files. Nothing here
//! touches the sandbox directly — callers hold the world-state critical
//! section and pass `jit-world` types in and out.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod accounts;
pub mod atomic;
pub mod breadcrumb;
pub mod snapshot;

pub use accounts::{
    create_account, load_account, name_valid, password_valid, save_account, validate_credentials, AccountError,
    PlayerAccount, CURRENT_ACCOUNT_VERSION,
};
pub use atomic::{write_atomic, AtomicWriteError};
pub use breadcrumb::{scan_for_orphan, OrphanSnapshotMarker};
pub use snapshot::{
    capture, load, restore, save, CombatSnapshot, EquipmentSnapshot, InstanceSnapshot, SnapshotError, WorldSnapshot,
    CURRENT_SNAPSHOT_VERSION,
};
