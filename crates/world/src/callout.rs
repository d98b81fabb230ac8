// SPDX-License-Identifier: MIT

//! Callout scheduler: one-shot and repeating scheduled method invocations.
//! Entries are id-keyed, never hold a reference to the target instance,
//! so `cancel_all` on destruct is a simple filter rather than a graph
//! walk.

use std::time::{Duration, Instant};

use jit_core::ObjectId;

/// A single scheduled invocation. `args` are opaque strings — the driver
/// doesn't interpret them, only the target method's host-call glue does.
#[derive(Debug, Clone)]
pub struct Callout {
    pub id: u64,
    pub target: ObjectId,
    pub method: String,
    pub due: Instant,
    pub interval: Option<Duration>,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct CalloutScheduler {
    next_id: u64,
    entries: Vec<Callout>,
}

impl CalloutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        target: ObjectId,
        method: impl Into<String>,
        after: Duration,
        args: Vec<String>,
        now: Instant,
    ) -> u64 {
        self.insert(target, method, now + after, None, args)
    }

    pub fn schedule_every(
        &mut self,
        target: ObjectId,
        method: impl Into<String>,
        interval: Duration,
        args: Vec<String>,
        now: Instant,
    ) -> u64 {
        self.insert(target, method, now + interval, Some(interval), args)
    }

    fn insert(
        &mut self,
        target: ObjectId,
        method: impl Into<String>,
        due: Instant,
        interval: Option<Duration>,
        args: Vec<String>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Callout {
            id,
            target,
            method: method.into(),
            due,
            interval,
            args,
        });
        id
    }

    /// Returns entries due at or before `now`. Repeating entries are
    /// rescheduled by exactly one interval; one-shot entries are removed.
    pub fn due(&mut self, now: Instant) -> Vec<Callout> {
        let mut fired = Vec::new();
        let mut remaining = Vec::with_capacity(self.entries.len());
        for mut entry in self.entries.drain(..) {
            if entry.due <= now {
                fired.push(entry.clone());
                match entry.interval {
                    Some(interval) => {
                        entry.due += interval;
                        remaining.push(entry);
                    }
                    None => {}
                }
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        fired
    }

    /// Cancels every entry targeting `id`, as destruct requires: every
    /// schedule referencing the object goes with it.
    pub fn cancel_all(&mut self, id: &ObjectId) {
        self.entries.retain(|c| &c.target != id);
    }

    pub fn cancel(&mut self, callout_id: u64) {
        self.entries.retain(|c| c.id != callout_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "callout_tests.rs"]
mod tests;
