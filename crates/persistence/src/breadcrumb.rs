// SPDX-License-Identifier: MIT

//! Stale-snapshot-write detection: a marker file written before a risky
//! operation starts and removed once it finishes cleanly. If the marker
//! is still present at startup, the previous process crashed mid-write.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::atomic::AtomicWriteError;

fn marker_path(snapshot_path: &Path) -> PathBuf {
    let mut name = snapshot_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".inprogress");
    snapshot_path.with_file_name(name)
}

pub(crate) fn mark_in_progress(snapshot_path: &Path) -> Result<(), AtomicWriteError> {
    if let Some(parent) = snapshot_path.parent() {
        fs::create_dir_all(parent).map_err(|e| AtomicWriteError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(marker_path(snapshot_path), Utc::now().to_rfc3339()).map_err(|e| AtomicWriteError::Io {
        path: marker_path(snapshot_path),
        source: e,
    })
}

pub(crate) fn clear_in_progress(snapshot_path: &Path) {
    let _ = fs::remove_file(marker_path(snapshot_path));
}

/// An orphaned in-progress marker found at startup: the previous process
/// began a snapshot write, at `started_at`, and never finished it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanSnapshotMarker {
    pub started_at: Option<DateTime<Utc>>,
}

/// Checks for (and clears) a stale marker left by a crash mid-save.
/// Returns `None` when the prior shutdown was clean.
pub fn scan_for_orphan(snapshot_path: &Path) -> Option<OrphanSnapshotMarker> {
    let marker = marker_path(snapshot_path);
    if !marker.exists() {
        return None;
    }
    let started_at = fs::read_to_string(&marker)
        .ok()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let _ = fs::remove_file(&marker);
    Some(OrphanSnapshotMarker { started_at })
}
