// SPDX-License-Identifier: MIT

//! Object manager: blueprint cache, instance registry, and the bridge
//! between an instance's persisted state store and a single safe-invoker
//! call. `clone`/`destruct`/`reload`/`unload` are the object lifecycle
//! operations; `call` is the shared mechanism every one of them (and the
//! heartbeat/callout schedulers) funnels through.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use jit_core::{BlueprintId, CallClass, Capabilities, InvokeOutcome, ObjectId, StateStore};
use jit_sandbox::{Blueprint, LoadError, Loader, SafeInvoker};

use crate::host_state::{HostState, PendingCallout, RoomEventFrame};
use crate::instance::Instance;
use crate::source::SourceProvider;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{0}: no such instance")]
    NotFound(ObjectId),
    #[error("blueprint {0} is not loaded")]
    BlueprintNotLoaded(BlueprintId),
    #[error("reading source for {0}: {1}")]
    Source(BlueprintId, String),
}

struct BlueprintEntry {
    blueprint: Blueprint,
    next_ordinal: u32,
    live: HashSet<ObjectId>,
}

/// Forced-GC-hint tuning knob. Rust/wasmtime already reclaim a dropped
/// `Module`/`Store` deterministically via `Drop`, so this is not a real
/// garbage collector; when enabled it
/// nudges the sandbox engine's epoch counter every `every_n_unloads`
/// destructs, which is the only engine-wide "do some housekeeping now"
/// signal wasmtime exposes. Off by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcPolicy {
    pub force_gc_on_unload: bool,
    pub every_n_unloads: u32,
}

/// Outcome of a single call through the object manager, folding the safe
/// invoker's classification together with whatever callouts the call
/// scheduled on itself.
pub struct CallResult {
    pub outcome: InvokeOutcome,
    pub callouts: Vec<PendingCallout>,
}

impl CallResult {
    fn ok() -> Self {
        Self {
            outcome: InvokeOutcome::Ok,
            callouts: Vec::new(),
        }
    }
}

pub struct ObjectManager {
    loader: Loader,
    invoker: SafeInvoker<HostState>,
    source: Arc<dyn SourceProvider>,
    blueprints: HashMap<BlueprintId, BlueprintEntry>,
    instances: HashMap<ObjectId, Instance>,
    gc_policy: GcPolicy,
    unloads_since_gc: u32,
}

impl ObjectManager {
    pub fn new(loader: Loader, invoker: SafeInvoker<HostState>, source: Arc<dyn SourceProvider>) -> Self {
        Self {
            loader,
            invoker,
            source,
            blueprints: HashMap::new(),
            instances: HashMap::new(),
            gc_policy: GcPolicy::default(),
            unloads_since_gc: 0,
        }
    }

    pub fn with_gc_policy(mut self, policy: GcPolicy) -> Self {
        self.gc_policy = policy;
        self
    }

    /// Idempotent; compiles on first use.
    pub fn load_blueprint(&mut self, id: &BlueprintId, now: Instant, now_ms: u64) -> Result<&Blueprint, ManagerError> {
        if !self.blueprints.contains_key(id) {
            let source = self
                .source
                .read_source(id)
                .map_err(|e| ManagerError::Source(id.clone(), e.to_string()))?;
            let blueprint = self.loader.load(id.clone(), &source, now, now_ms)?;
            self.blueprints.insert(
                id.clone(),
                BlueprintEntry {
                    blueprint,
                    next_ordinal: 1,
                    live: HashSet::new(),
                },
            );
        }
        Ok(&self.blueprints[id].blueprint)
    }

    pub fn blueprint(&self, id: &BlueprintId) -> Option<&Blueprint> {
        self.blueprints.get(id).map(|e| &e.blueprint)
    }

    /// `clone(id, initialState?) -> instanceId`. The initial state map is
    /// applied before `on_load` so the hook sees it.
    pub fn clone_instance(
        &mut self,
        id: &BlueprintId,
        initial_state: Option<StateStore>,
        now: Instant,
        now_ms: u64,
    ) -> Result<(ObjectId, CallResult), ManagerError> {
        self.load_blueprint(id, now, now_ms)?;
        let Some(entry) = self.blueprints.get_mut(id) else {
            return Err(ManagerError::BlueprintNotLoaded(id.clone()));
        };
        let ordinal = entry.next_ordinal;
        entry.next_ordinal += 1;
        let object_id = ObjectId::new(id.clone(), ordinal);
        entry.live.insert(object_id.clone());
        let capabilities = entry.blueprint.capabilities;

        let instance = Instance {
            object_id: object_id.clone(),
            blueprint_id: id.clone(),
            created_at: now,
            capabilities,
            state: initial_state.unwrap_or_default(),
        };
        self.instances.insert(object_id.clone(), instance);

        let result = if capabilities.contains(Capabilities::ON_LOAD) {
            self.call(&object_id, "on_load", CallClass::Hook, Vec::new(), now_ms)?
        } else {
            CallResult::ok()
        };
        Ok((object_id, result))
    }

    pub fn get(&self, id: &ObjectId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Instance> {
        self.instances.get_mut(id)
    }

    pub fn instance_ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.instances.keys()
    }

    /// Every live instance, for snapshot capture. Order is whatever the
    /// underlying map yields; `jit-persistence` sorts by object id before
    /// serialising so the snapshot document is stable byte-for-byte.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn instance_count(&self, id: &BlueprintId) -> usize {
        self.blueprints.get(id).map(|e| e.live.len()).unwrap_or(0)
    }

    pub fn next_ordinal(&self, id: &BlueprintId) -> u32 {
        self.blueprints.get(id).map(|e| e.next_ordinal).unwrap_or(1)
    }

    /// Restores a blueprint's per-blueprint ordinal counter. The blueprint
    /// must already be loaded.
    pub fn set_next_ordinal(&mut self, id: &BlueprintId, ordinal: u32) -> Result<(), ManagerError> {
        let entry = self
            .blueprints
            .get_mut(id)
            .ok_or_else(|| ManagerError::BlueprintNotLoaded(id.clone()))?;
        entry.next_ordinal = ordinal;
        Ok(())
    }

    /// Re-creates a single instance straight from snapshot data: no
    /// `on_load` call, state store applied verbatim. The blueprint must
    /// already be loaded by the caller (once per distinct blueprint id in
    /// the snapshot, not once per instance).
    pub fn restore_instance(
        &mut self,
        blueprint_id: &BlueprintId,
        object_id: ObjectId,
        state: StateStore,
        now: Instant,
    ) -> Result<(), ManagerError> {
        let entry = self
            .blueprints
            .get_mut(blueprint_id)
            .ok_or_else(|| ManagerError::BlueprintNotLoaded(blueprint_id.clone()))?;
        entry.live.insert(object_id.clone());
        entry.next_ordinal = entry.next_ordinal.max(object_id.ordinal() + 1);
        let capabilities = entry.blueprint.capabilities;

        self.instances.insert(
            object_id.clone(),
            Instance {
                object_id,
                blueprint_id: blueprint_id.clone(),
                created_at: now,
                capabilities,
                state,
            },
        );
        Ok(())
    }

    /// Calls `method` on `id` through the safe invoker, rebuilding a fresh
    /// `Store`/host state from the instance's persisted state for this one
    /// call and writing the (possibly mutated) state back afterwards —
    /// world code never holds a live reference into the shared world-state
    /// critical section while it runs.
    pub fn call(
        &mut self,
        id: &ObjectId,
        method: &str,
        class: CallClass,
        room_members: Vec<String>,
        now_ms: u64,
    ) -> Result<CallResult, ManagerError> {
        self.call_with_extras(id, method, class, room_members, now_ms, None, None)
    }

    pub fn call_for_reload(
        &mut self,
        id: &ObjectId,
        method: &str,
        class: CallClass,
        room_members: Vec<String>,
        now_ms: u64,
        prev_reload_ms: u64,
    ) -> Result<CallResult, ManagerError> {
        self.call_with_extras(id, method, class, room_members, now_ms, Some(prev_reload_ms), None)
    }

    /// Fans a room event into a single AI-NPC observer call.
    pub fn call_for_room_event(
        &mut self,
        id: &ObjectId,
        method: &str,
        room_members: Vec<String>,
        now_ms: u64,
        frame: RoomEventFrame,
    ) -> Result<CallResult, ManagerError> {
        self.call_with_extras(id, method, CallClass::Hook, room_members, now_ms, None, Some(frame))
    }

    #[allow(clippy::too_many_arguments)]
    fn call_with_extras(
        &mut self,
        id: &ObjectId,
        method: &str,
        class: CallClass,
        room_members: Vec<String>,
        now_ms: u64,
        prev_reload_ms: Option<u64>,
        room_event: Option<RoomEventFrame>,
    ) -> Result<CallResult, ManagerError> {
        let instance = self.instances.get(id).ok_or_else(|| ManagerError::NotFound(id.clone()))?;
        let entry = self
            .blueprints
            .get(&instance.blueprint_id)
            .ok_or_else(|| ManagerError::BlueprintNotLoaded(instance.blueprint_id.clone()))?;

        if !entry.blueprint.exports_hook(method) && !entry.blueprint.has_method(method) {
            return Ok(CallResult {
                outcome: InvokeOutcome::DomainError(format!("no such export: {method}")),
                callouts: Vec::new(),
            });
        }

        let mut host = HostState::new(id.to_string(), instance.state.clone(), room_members, now_ms);
        if let Some(prev) = prev_reload_ms {
            host = host.with_prev_reload_ms(prev);
        }
        if let Some(frame) = room_event {
            host = host.with_room_event(frame);
        }

        let (mut store, wasm_instance) = match self.invoker.instantiate(&entry.blueprint.module, host) {
            Ok(pair) => pair,
            Err(outcome) => return Ok(CallResult { outcome, callouts: Vec::new() }),
        };
        let outcome = self.invoker.call(&mut store, &wasm_instance, method, class);
        let host_state = store.into_data();
        if let Some(instance) = self.instances.get_mut(id) {
            instance.state = host_state.state;
        }
        Ok(CallResult {
            outcome,
            callouts: host_state.pending_callouts,
        })
    }

    /// `destruct(instanceId)`: calls `on_destruct` if present, then drops
    /// the instance. Caller is responsible for purging containment,
    /// equipment, combat, and schedules referencing this object — those
    /// registries are siblings of the object manager, not owned by it.
    pub fn destruct(&mut self, id: &ObjectId, now_ms: u64) -> Result<CallResult, ManagerError> {
        let instance = self.instances.get(id).ok_or_else(|| ManagerError::NotFound(id.clone()))?;
        let result = if instance.capabilities.contains(Capabilities::ON_DESTRUCT) {
            self.call(id, "on_destruct", CallClass::Hook, Vec::new(), now_ms)?
        } else {
            CallResult::ok()
        };
        let Some(instance) = self.instances.remove(id) else {
            return Err(ManagerError::NotFound(id.clone()));
        };
        if let Some(entry) = self.blueprints.get_mut(&instance.blueprint_id) {
            entry.live.remove(id);
        }
        self.maybe_gc_hint();
        Ok(result)
    }

    fn maybe_gc_hint(&mut self) {
        if !self.gc_policy.force_gc_on_unload {
            return;
        }
        self.unloads_since_gc += 1;
        if self.unloads_since_gc >= self.gc_policy.every_n_unloads.max(1) {
            self.loader.engine().increment_epoch();
            self.unloads_since_gc = 0;
        }
    }

    /// `reload(blueprintId)`: recompile, then for every live instance,
    /// preserve its state store and invoke
    /// `on_reload(previousBlueprintTimestamp)` against the new code. If
    /// recompilation fails, the old blueprint is left intact — `?`
    /// propagates before anything is mutated.
    pub fn reload(&mut self, id: &BlueprintId, now: Instant, now_ms: u64) -> Result<Vec<(ObjectId, CallResult)>, ManagerError> {
        let source = self
            .source
            .read_source(id)
            .map_err(|e| ManagerError::Source(id.clone(), e.to_string()))?;
        let new_blueprint = self.loader.load(id.clone(), &source, now, now_ms)?;
        let previous_loaded_at_ms = self.blueprints.get(id).map(|e| e.blueprint.loaded_at_ms);
        let new_caps = new_blueprint.capabilities;

        let live_ids: Vec<ObjectId> = match self.blueprints.get_mut(id) {
            Some(entry) => {
                entry.blueprint = new_blueprint;
                entry.live.iter().cloned().collect()
            }
            None => {
                self.blueprints.insert(
                    id.clone(),
                    BlueprintEntry {
                        blueprint: new_blueprint,
                        next_ordinal: 1,
                        live: HashSet::new(),
                    },
                );
                Vec::new()
            }
        };

        let mut results = Vec::with_capacity(live_ids.len());
        for object_id in live_ids {
            if let Some(instance) = self.instances.get_mut(&object_id) {
                instance.capabilities = new_caps;
            }
            let result = if new_caps.contains(Capabilities::ON_RELOAD) {
                match previous_loaded_at_ms {
                    Some(prev) => self.call_for_reload(
                        &object_id,
                        "on_reload",
                        CallClass::Hook,
                        Vec::new(),
                        now_ms,
                        prev,
                    )?,
                    None => self.call(&object_id, "on_reload", CallClass::Hook, Vec::new(), now_ms)?,
                }
            } else {
                CallResult::ok()
            };
            results.push((object_id, result));
        }
        Ok(results)
    }

    /// `unload(blueprintId)`: destructs every instance, then drops the
    /// blueprint entry — the last reference to its `Module` goes with it.
    /// A blueprint with no live instances may be unloaded directly;
    /// otherwise unload cascades destruction to every live instance first.
    pub fn unload(&mut self, id: &BlueprintId, now_ms: u64) -> Result<Vec<ObjectId>, ManagerError> {
        let live: Vec<ObjectId> = self
            .blueprints
            .get(id)
            .map(|e| e.live.iter().cloned().collect())
            .unwrap_or_default();
        for object_id in &live {
            self.destruct(object_id, now_ms)?;
        }
        self.blueprints.remove(id);
        Ok(live)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
