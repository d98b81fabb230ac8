// SPDX-License-Identifier: MIT

//! Wires a `WorldState` out of the sandbox crate's pieces: one
//! `SandboxEngine`, one `Linker`, one `SafeInvoker`, one `Loader`, and a
//! `FsSourceProvider` rooted at `Paths.WorldDirectory`.

use std::sync::Arc;
use std::time::Duration;

use jit_sandbox::{build_linker, Loader, SafeInvoker, SandboxEngine, SecurityBudget};
use jit_world::{FsSourceProvider, GcPolicy, HostState, ObjectManager, WorldState};

use crate::config::{PathsGroup, PerformanceGroup, SecurityGroup};

/// Epoch ticker period. Epoch-tick budgets in `SecurityBudget` are
/// expressed as a multiple of this, so it is also the invoker's timing
/// resolution floor.
const EPOCH_TICK: Duration = Duration::from_millis(1);

/// Fuel units charged per millisecond of configured timeout — a tuning
/// constant, not a spec value; generous enough that a well-behaved world
/// method never hits the fuel ceiling before the epoch deadline does.
const FUEL_PER_MS: u64 = 50_000;

pub fn budget_from(security: &SecurityGroup) -> SecurityBudget {
    SecurityBudget {
        hook_fuel: security.hook_timeout_ms.max(1) * FUEL_PER_MS,
        hook_epoch_ticks: security.hook_timeout_ms.max(1),
        heartbeat_fuel: security.heartbeat_timeout_ms.max(1) * FUEL_PER_MS,
        heartbeat_epoch_ticks: security.heartbeat_timeout_ms.max(1),
    }
}

pub fn build_world(paths: &PathsGroup, security: &SecurityGroup, performance: &PerformanceGroup) -> anyhow::Result<WorldState> {
    let sandbox = SandboxEngine::new(EPOCH_TICK)?;
    let linker = build_linker::<HostState>(sandbox.inner())?;
    let invoker = SafeInvoker::new(sandbox.inner().clone(), linker, budget_from(security));
    let loader = Loader::new(sandbox.inner().clone());
    let source = FsSourceProvider::new(paths.world_directory.clone(), "wat");
    let gc_policy = GcPolicy {
        force_gc_on_unload: performance.force_gc_on_unload,
        every_n_unloads: performance.force_gc_every_n_unloads,
    };
    let objects = ObjectManager::new(loader, invoker, Arc::new(source)).with_gc_policy(gc_policy);
    Ok(WorldState::new(objects))
}
