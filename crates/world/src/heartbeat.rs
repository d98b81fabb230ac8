// SPDX-License-Identifier: MIT

//! Heartbeat scheduler: periodic per-object tick. `due()` must take O(1)
//! when nothing is due — the scheduler tracks the earliest next-fire time
//! across all registrations rather than scanning on every call.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jit_core::ObjectId;

struct Registration {
    interval: Duration,
    next_fire: Instant,
}

#[derive(Default)]
pub struct HeartbeatScheduler {
    registrations: HashMap<ObjectId, Registration>,
    earliest_next: Option<Instant>,
}

impl HeartbeatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ObjectId, interval: Duration, now: Instant) {
        let next_fire = now + interval;
        self.earliest_next = Some(match self.earliest_next {
            Some(current) => current.min(next_fire),
            None => next_fire,
        });
        self.registrations.insert(id, Registration { interval, next_fire });
    }

    pub fn cancel(&mut self, id: &ObjectId) {
        self.registrations.remove(id);
        self.recompute_earliest();
    }

    pub fn is_registered(&self, id: &ObjectId) -> bool {
        self.registrations.contains_key(id)
    }

    /// Returns every object whose next-fire time is `<= now`, and advances
    /// each returned object's next-fire to `now + interval`. Snapshots the
    /// registration set before scanning so re-registration during
    /// iteration (e.g. from inside a heartbeat call) is safe.
    pub fn due(&mut self, now: Instant) -> Vec<ObjectId> {
        match self.earliest_next {
            Some(next) if next <= now => {}
            _ => return Vec::new(),
        }

        let ids: Vec<ObjectId> = self.registrations.keys().cloned().collect();
        let mut fired = Vec::new();
        for id in ids {
            if let Some(reg) = self.registrations.get_mut(&id) {
                if reg.next_fire <= now {
                    fired.push(id);
                    reg.next_fire += reg.interval;
                }
            }
        }
        self.recompute_earliest();
        fired
    }

    fn recompute_earliest(&mut self) {
        self.earliest_next = self.registrations.values().map(|r| r.next_fire).min();
    }

    /// Invariant 11: the scheduler's next-due time equals `min` over
    /// registered entries after every `due()`.
    pub fn next_due(&self) -> Option<Instant> {
        self.earliest_next
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
