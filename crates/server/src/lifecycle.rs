// SPDX-License-Identifier: MIT

//! Startup and shutdown sequencing: create directories, acquire an
//! exclusive lock file first to prevent two drivers racing on the same
//! save directory, scan for an orphaned in-progress snapshot marker,
//! then restore the world from its last snapshot before accepting
//! connections. Restore failure is fatal: the server exits with a
//! non-zero status before accepting connections.

use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use jit_core::Clock;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::world_setup::build_world;
use jit_world::WorldState;

/// Resolved on-disk layout, all rooted at the working directory.
pub struct ResolvedPaths {
    pub world_dir: PathBuf,
    pub save_dir: PathBuf,
    pub players_dir: PathBuf,
    pub save_path: PathBuf,
    pub lock_path: PathBuf,
}

impl ResolvedPaths {
    pub fn from_config(config: &AppConfig) -> Self {
        let save_dir = config.paths.save_directory.clone();
        Self {
            world_dir: config.paths.world_directory.clone(),
            players_dir: config.paths.players_directory.clone(),
            save_path: save_dir.join(&config.paths.save_file_name),
            lock_path: save_dir.join("jitrealmd.lock"),
            save_dir,
        }
    }
}

/// Holds the exclusive lock for the process lifetime; dropping it releases
/// the lock (matching the teacher's "lock file is released automatically
/// when self.lock_file is dropped").
pub struct LockGuard(#[allow(dead_code)] File);

fn acquire_lock(lock_path: &Path) -> Result<LockGuard, ServerError> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| ServerError::LockFailed(lock_path.to_path_buf(), e))?;
    file.try_lock_exclusive()
        .map_err(|e| ServerError::LockFailed(lock_path.to_path_buf(), e))?;
    Ok(LockGuard(file))
}

pub struct Started {
    pub world: WorldState,
    pub lock: LockGuard,
}

/// Runs the full startup sequence and returns a world ready to accept
/// connections. Restore failure propagates to the caller, which exits
/// with a non-zero status before binding anything.
pub fn startup(config: &AppConfig, paths: &ResolvedPaths, clock: &dyn Clock) -> Result<Started, ServerError> {
    std::fs::create_dir_all(&paths.save_dir)?;
    std::fs::create_dir_all(&paths.players_dir)?;
    std::fs::create_dir_all(&paths.world_dir)?;

    let lock = acquire_lock(&paths.lock_path)?;

    if let Some(orphan) = jit_persistence::scan_for_orphan(&paths.save_path) {
        warn!(
            started_at = ?orphan.started_at,
            "found an in-progress snapshot marker from a prior run that did not shut down cleanly"
        );
    }

    let mut world = build_world(&config.paths, &config.security, &config.performance)?;

    let now = clock.now();
    let now_ms = clock.epoch_ms();
    match jit_persistence::load(&paths.save_path).map_err(ServerError::Save)? {
        Some(snapshot) => {
            let heartbeat_interval = std::time::Duration::from_secs(config.game_loop.default_heartbeat_seconds.max(1));
            jit_persistence::restore(&snapshot, &mut world, heartbeat_interval, now, now_ms)?;
            info!(path = %paths.save_path.display(), "restored world snapshot");
        }
        None => {
            info!("no snapshot found at {}; starting with an empty world", paths.save_path.display());
        }
    }

    Ok(Started { world, lock })
}

/// Captures and atomically writes a snapshot via write-to-temp + atomic
/// rename.
pub fn save_snapshot(world: &WorldState, paths: &ResolvedPaths, clock: &dyn Clock) -> Result<(), ServerError> {
    let now = clock.now();
    let now_ms = clock.epoch_ms();
    let saved_at = chrono::Utc::now();
    let snapshot = jit_persistence::capture(world, now, now_ms, saved_at);
    jit_persistence::save(&paths.save_path, &snapshot).map_err(ServerError::Save)
}
