// SPDX-License-Identifier: MIT

//! World snapshot: serialises containment, equipment, combat pairings, and
//! every instance's `(blueprintId, objectId, stateStore)`. Code itself is
//! never serialised — restore re-instantiates from the world source tree
//! via the object manager's ordinary `load_blueprint`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use jit_core::{BlueprintId, ObjectId, StateStore};
use jit_world::{ManagerError, WorldState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atomic::{write_atomic, AtomicWriteError};
use crate::breadcrumb;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Write(#[from] AtomicWriteError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("restoring {0}: {1}")]
    Object(ObjectId, ManagerError),
    #[error("loading blueprint {0}: {1}")]
    Blueprint(BlueprintId, ManagerError),
    #[error("restoring containment edge {child} -> {parent}: {source}")]
    Containment {
        child: ObjectId,
        parent: ObjectId,
        #[source]
        source: jit_core::ContainmentError,
    },
    #[error("malformed id in snapshot: {0:?}")]
    MalformedId(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub object_id: String,
    pub blueprint_id: String,
    pub state: StateStore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    pub wearer: String,
    pub slot: String,
    pub item: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub a: String,
    pub b: String,
    pub next_round_ms: u64,
}

/// `{ version, savedAt, instances, containment, equipment, combat,
/// counters: {perBlueprintOrdinal} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub instances: Vec<InstanceSnapshot>,
    /// `(child, parent)` pairs.
    pub containment: Vec<(String, String)>,
    pub equipment: Vec<EquipmentSnapshot>,
    pub combat: Vec<CombatSnapshot>,
    /// Per-blueprint next-ordinal counter.
    pub counters: BTreeMap<String, u32>,
}

/// Captures the entire world-state critical section into a serialisable
/// document. Called with the same `now`/`now_ms` the caller's tick loop is
/// already using — no component reads wall time directly.
pub fn capture(world: &WorldState, now: Instant, now_ms: u64, saved_at: DateTime<Utc>) -> WorldSnapshot {
    let mut instances: Vec<InstanceSnapshot> = world
        .objects
        .iter()
        .map(|instance| InstanceSnapshot {
            object_id: instance.object_id.to_string(),
            blueprint_id: instance.blueprint_id.to_string(),
            state: instance.state.clone(),
        })
        .collect();
    instances.sort_by(|a, b| a.object_id.cmp(&b.object_id));

    let mut containment: Vec<(String, String)> = world
        .containment
        .iter()
        .map(|(child, parent)| (child.to_string(), parent.to_string()))
        .collect();
    containment.sort();

    let mut equipment: Vec<EquipmentSnapshot> = world
        .equipment
        .iter()
        .map(|(wearer, slot, item)| EquipmentSnapshot {
            wearer: wearer.to_string(),
            slot: slot.to_string(),
            item: item.to_string(),
        })
        .collect();
    equipment.sort_by(|a, b| (&a.wearer, &a.slot).cmp(&(&b.wearer, &b.slot)));

    let combat = world
        .combat
        .snapshot(now, now_ms)
        .into_iter()
        .map(|(a, b, next_round_ms)| CombatSnapshot {
            a: a.to_string(),
            b: b.to_string(),
            next_round_ms,
        })
        .collect();

    let mut counters = BTreeMap::new();
    for instance in &instances {
        counters
            .entry(instance.blueprint_id.clone())
            .or_insert_with(|| world.objects.next_ordinal(&BlueprintId::new(&instance.blueprint_id)));
    }

    WorldSnapshot {
        version: CURRENT_SNAPSHOT_VERSION,
        saved_at,
        instances,
        containment,
        equipment,
        combat,
        counters,
    }
}

/// Restoration order: create instances (without firing `on_load`) →
/// rebuild containment → rebuild equipment → rebuild combat → restore
/// ordinals → invoke `post_restore` on objects that implement it.
///
/// `heartbeat_interval` is the `GameLoop.DefaultHeartbeatSeconds` a fresh
/// `spawn` would use; restored instances declaring the heartbeat capability
/// are re-registered at that cadence so they keep ticking across a restart
/// instead of going silent until the next explicit spawn.
pub fn restore(
    snapshot: &WorldSnapshot,
    world: &mut WorldState,
    heartbeat_interval: std::time::Duration,
    now: Instant,
    now_ms: u64,
) -> Result<(), SnapshotError> {
    for instance in &snapshot.instances {
        let blueprint_id = BlueprintId::new(&instance.blueprint_id);
        let object_id: ObjectId = instance
            .object_id
            .parse()
            .map_err(|_| SnapshotError::MalformedId(instance.object_id.clone()))?;
        world
            .objects
            .load_blueprint(&blueprint_id, now, now_ms)
            .map_err(|e| SnapshotError::Blueprint(blueprint_id.clone(), e))?;
        world
            .objects
            .restore_instance(&blueprint_id, object_id.clone(), instance.state.clone(), now)
            .map_err(|e| SnapshotError::Object(object_id.clone(), e))?;
        if world
            .objects
            .get(&object_id)
            .is_some_and(|i| i.capabilities.contains(jit_core::Capabilities::HEARTBEAT))
        {
            world.heartbeat.register(object_id, heartbeat_interval, now);
        }
    }

    for (child, parent) in &snapshot.containment {
        let child: ObjectId = child.parse().map_err(|_| SnapshotError::MalformedId(child.clone()))?;
        let parent: ObjectId = parent.parse().map_err(|_| SnapshotError::MalformedId(parent.clone()))?;
        world
            .containment
            .add(parent.clone(), child.clone())
            .map_err(|source| SnapshotError::Containment { child, parent, source })?;
    }

    for entry in &snapshot.equipment {
        let wearer: ObjectId = entry.wearer.parse().map_err(|_| SnapshotError::MalformedId(entry.wearer.clone()))?;
        let item: ObjectId = entry.item.parse().map_err(|_| SnapshotError::MalformedId(entry.item.clone()))?;
        let item_for_error = item.clone();
        world
            .equipment
            .equip(&mut world.containment, wearer.clone(), entry.slot.clone(), item)
            .map_err(|source| SnapshotError::Containment {
                child: item_for_error,
                parent: wearer,
                source,
            })?;
    }

    for entry in &snapshot.combat {
        let a: ObjectId = entry.a.parse().map_err(|_| SnapshotError::MalformedId(entry.a.clone()))?;
        let b: ObjectId = entry.b.parse().map_err(|_| SnapshotError::MalformedId(entry.b.clone()))?;
        world.combat.restore_pair(a, b, entry.next_round_ms, now, now_ms);
    }

    for (blueprint_id, ordinal) in &snapshot.counters {
        let blueprint_id = BlueprintId::new(blueprint_id);
        world
            .objects
            .set_next_ordinal(&blueprint_id, *ordinal)
            .map_err(|e| SnapshotError::Blueprint(blueprint_id.clone(), e))?;
    }

    let post_restore_targets: Vec<ObjectId> = snapshot
        .instances
        .iter()
        .filter_map(|i| i.object_id.parse().ok())
        .filter(|id: &ObjectId| {
            world
                .objects
                .get(id)
                .is_some_and(|instance| instance.capabilities.contains(jit_core::Capabilities::POST_RESTORE))
        })
        .collect();
    for id in post_restore_targets {
        let room_members = room_members_of(world, &id);
        world
            .objects
            .call(&id, "post_restore", jit_core::CallClass::Hook, room_members, now_ms)
            .map_err(|e| SnapshotError::Object(id, e))?;
    }

    Ok(())
}

fn room_members_of(world: &WorldState, id: &ObjectId) -> Vec<String> {
    let Some(container) = world.containment.get_container(id) else {
        return Vec::new();
    };
    world
        .containment
        .get_contents(container)
        .iter()
        .filter(|member| *member != id)
        .map(ToString::to_string)
        .collect()
}

/// Serialises `snapshot` to `path` atomically, marking (and clearing) an
/// in-progress breadcrumb around the write so a crash mid-save leaves a
/// detectable trace rather than silently looking like a clean prior
/// shutdown.
pub fn save(path: &Path, snapshot: &WorldSnapshot) -> Result<(), SnapshotError> {
    breadcrumb::mark_in_progress(path)?;
    let json = serde_json::to_vec_pretty(snapshot)?;
    write_atomic(path, &json)?;
    breadcrumb::clear_in_progress(path);
    Ok(())
}

/// Loads a snapshot document from `path`. Returns `Ok(None)` if no
/// snapshot file exists yet (a fresh world).
pub fn load(path: &Path) -> Result<Option<WorldSnapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let snapshot: WorldSnapshot = serde_json::from_str(&text)?;
    Ok(Some(snapshot))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
