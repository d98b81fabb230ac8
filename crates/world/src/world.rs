// SPDX-License-Identifier: MIT

//! World state: the object manager, containment/equipment registries,
//! combat subsystem, and both schedulers live behind a single critical
//! section, mutated and iterated as one unit rather than as separately
//! locked pieces. `jit-commands`/`jitrealmd` hold this behind a single
//! `parking_lot::Mutex`.

use std::time::{Duration, Instant};

use jit_core::{BlueprintId, CallClass, Capabilities, ContainmentError, ObjectId, RoomEvent, RoomEventKind, StateStore};

use crate::callout::CalloutScheduler;
use crate::combat::CombatRegistry;
use crate::containment::ContainmentRegistry;
use crate::equipment::EquipmentRegistry;
use crate::heartbeat::HeartbeatScheduler;
use crate::host_state::RoomEventFrame;
use crate::manager::{CallResult, ManagerError, ObjectManager};
use crate::metrics::Metrics;

fn room_event_kind_tag(kind: RoomEventKind) -> i32 {
    match kind {
        RoomEventKind::Speech => 0,
        RoomEventKind::Emote => 1,
        RoomEventKind::ItemDropped => 2,
        RoomEventKind::ItemGiven => 3,
        RoomEventKind::Arrival => 4,
        RoomEventKind::Departure => 5,
        RoomEventKind::Combat => 6,
        RoomEventKind::Custom => 7,
    }
}

/// Everything a command or tick-loop step needs to mutate in one place.
/// Construction takes an already-built `ObjectManager` since that alone
/// needs sandbox wiring (engine, linker, budgets) the other registries
/// don't.
pub struct WorldState {
    pub objects: ObjectManager,
    pub containment: ContainmentRegistry,
    pub equipment: EquipmentRegistry,
    pub combat: CombatRegistry,
    pub heartbeat: HeartbeatScheduler,
    pub callouts: CalloutScheduler,
    pub metrics: Metrics,
}

impl WorldState {
    pub fn new(objects: ObjectManager) -> Self {
        Self {
            objects,
            containment: ContainmentRegistry::new(),
            equipment: EquipmentRegistry::new(),
            combat: CombatRegistry::new(),
            heartbeat: HeartbeatScheduler::new(),
            callouts: CalloutScheduler::new(),
            metrics: Metrics::new(),
        }
    }

    /// Clones a new instance of `blueprint` and, if it declares the
    /// heartbeat capability, registers it with the scheduler at
    /// `heartbeat_interval`. Callers that want a spawned object to actually
    /// tick should go through this rather than `objects.clone_instance`
    /// directly, which only allocates the instance.
    pub fn spawn(
        &mut self,
        blueprint: &BlueprintId,
        initial_state: Option<StateStore>,
        heartbeat_interval: Duration,
        now: Instant,
        now_ms: u64,
    ) -> Result<(ObjectId, CallResult), ManagerError> {
        let (id, result) = self.objects.clone_instance(blueprint, initial_state, now, now_ms)?;
        if self
            .objects
            .get(&id)
            .is_some_and(|i| i.capabilities.contains(Capabilities::HEARTBEAT))
        {
            self.heartbeat.register(id.clone(), heartbeat_interval, now);
        }
        Ok((id, result))
    }

    fn room_members_of(&self, id: &ObjectId) -> Vec<String> {
        let Some(container) = self.containment.get_container(id) else {
            return Vec::new();
        };
        self.containment
            .get_contents(container)
            .iter()
            .filter(|member| *member != id)
            .map(ToString::to_string)
            .collect()
    }

    /// Moves `child` into `new_container`, firing `on_leave`/`on_enter`
    /// only when crossing a room boundary and both endpoints are rooms.
    /// Applies any callouts the hooks schedule.
    pub fn move_object(
        &mut self,
        child: ObjectId,
        new_container: ObjectId,
        now: Instant,
        now_ms: u64,
    ) -> Result<(), ContainmentError> {
        let old_container = self.containment.get_container(&child).cloned();
        let crosses_rooms = self.is_room(&new_container)
            && old_container.as_ref().is_some_and(|c| self.is_room(c));

        self.containment.move_to(child.clone(), new_container.clone())?;

        if crosses_rooms {
            if let Some(old) = old_container {
                self.fire_hook_best_effort(&old, "on_leave", now, now_ms);
            }
            self.fire_hook_best_effort(&new_container, "on_enter", now, now_ms);
        }
        Ok(())
    }

    fn is_room(&self, id: &ObjectId) -> bool {
        self.objects
            .get(id)
            .is_some_and(|i| i.capabilities.contains(jit_core::Capabilities::ROOM))
    }

    fn fire_hook_best_effort(&mut self, id: &ObjectId, hook: &str, now: Instant, now_ms: u64) {
        let room_members = self.room_members_of(id);
        if let Ok(result) = self.objects.call(id, hook, CallClass::Hook, room_members, now_ms) {
            self.metrics.record_invoke(&result.outcome);
            self.apply_callouts(id, result.callouts, now);
        }
    }

    /// Fires a due heartbeat, tallying the outcome and applying any
    /// callouts the method scheduled, the same way `fire_hook_best_effort`
    /// does for room-crossing hooks.
    pub fn fire_heartbeat(&mut self, id: &ObjectId, now: Instant, now_ms: u64) {
        let room_members = self.room_members_of(id);
        if let Ok(result) = self.objects.call(id, "heartbeat", CallClass::Heartbeat, room_members, now_ms) {
            self.metrics.record_invoke(&result.outcome);
            self.apply_callouts(id, result.callouts, now);
        }
    }

    /// Fires a due callout: invokes the scheduled method on its target,
    /// tallying the outcome and re-applying any callouts it schedules (so a
    /// repeating callout chain keeps its own tail alive).
    pub fn fire_callout(&mut self, callout: &crate::callout::Callout, now: Instant, now_ms: u64) {
        let room_members = self.room_members_of(&callout.target);
        if let Ok(result) = self.objects.call(&callout.target, &callout.method, CallClass::Hook, room_members, now_ms) {
            self.metrics.record_invoke(&result.outcome);
            self.apply_callouts(&callout.target, result.callouts, now);
        }
    }

    fn apply_callouts(&mut self, target: &ObjectId, callouts: Vec<crate::host_state::PendingCallout>, now: Instant) {
        for c in callouts {
            let after = Duration::from_millis(c.after_ms);
            if c.repeat {
                self.callouts
                    .schedule_every(target.clone(), c.method, Duration::from_millis(c.interval_ms), Vec::new(), now);
            } else {
                self.callouts.schedule(target.clone(), c.method, after, Vec::new(), now);
            }
        }
    }

    /// Fans `event` out to every AI-NPC-capable object sharing `room` with
    /// the actor, excluding the actor itself — observers never observe
    /// events they themselves generated. Best-effort: a misbehaving
    /// observer is logged by the safe invoker and does not stop the
    /// fan-out to the rest of the room.
    pub fn fire_room_event(&mut self, room: &ObjectId, event: &RoomEvent, now: Instant, now_ms: u64) {
        let members = self.containment.get_contents(room);
        let observers: Vec<ObjectId> = members
            .iter()
            .filter(|m| **m != event.actor_id)
            .filter(|m| {
                self.objects
                    .get(m)
                    .is_some_and(|i| i.capabilities.contains(Capabilities::AI_NPC))
            })
            .cloned()
            .collect();

        for observer in observers {
            let room_members = self.room_members_of(&observer);
            let frame = RoomEventFrame {
                kind: room_event_kind_tag(event.kind),
                actor: event.actor_id.to_string(),
                message: event.message.clone(),
            };
            if let Ok(result) =
                self.objects
                    .call_for_room_event(&observer, "on_room_event", room_members, now_ms, frame)
            {
                self.metrics.record_invoke(&result.outcome);
                self.apply_callouts(&observer, result.callouts, now);
            }
        }
    }

    /// Destructs `id`: cancels its schedules, purges it from every
    /// registry, then asks the object manager to run `on_destruct` and
    /// drop it.
    pub fn destruct(&mut self, id: &ObjectId, now_ms: u64) -> Result<CallResult, ManagerError> {
        self.heartbeat.cancel(id);
        self.callouts.cancel_all(id);
        self.containment.purge(id);
        self.equipment.purge(id);
        self.combat.purge(id);
        self.objects.destruct(id, now_ms)
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
