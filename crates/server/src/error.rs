// SPDX-License-Identifier: MIT

//! Top-level driver errors: a `thiserror`-derived enum at every fallible
//! boundary; `anyhow` is reserved for `main()` itself.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to acquire lock at {0}: is another jitrealmd already running?")]
    LockFailed(PathBuf, #[source] std::io::Error),

    #[error("failed to bind {0}: {1}")]
    BindFailed(String, #[source] std::io::Error),

    #[error("failed to restore world snapshot: {0}")]
    Restore(#[from] jit_persistence::SnapshotError),

    #[error("failed to save world snapshot: {0}")]
    Save(jit_persistence::SnapshotError),

    #[error(transparent)]
    Account(#[from] jit_persistence::AccountError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
