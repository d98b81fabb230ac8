// SPDX-License-Identifier: MIT

//! Combat subsystem: pair bookkeeping only, no damage semantics — damage
//! belongs to the external `kill` command. The registry guarantees
//! symmetric pairing by construction: `start` always writes both
//! directions, `end` always removes both.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jit_core::ObjectId;
use rand::Rng;

struct Pairing {
    target: ObjectId,
    next_round: Instant,
}

#[derive(Default)]
pub struct CombatRegistry {
    pairs: HashMap<ObjectId, Pairing>,
}

impl CombatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_combat(&self, id: &ObjectId) -> bool {
        self.pairs.contains_key(id)
    }

    pub fn target(&self, id: &ObjectId) -> Option<&ObjectId> {
        self.pairs.get(id).map(|p| &p.target)
    }

    /// Starts a symmetric pairing between `a` and `b`. Both directions get
    /// the same `next_round` so the first round fires for either party at
    /// the same tick.
    pub fn start(&mut self, a: ObjectId, b: ObjectId, now: Instant, round_interval: Duration) {
        let next_round = now + round_interval;
        self.pairs.insert(
            a.clone(),
            Pairing {
                target: b.clone(),
                next_round,
            },
        );
        self.pairs.insert(
            b,
            Pairing {
                target: a,
                next_round,
            },
        );
    }

    /// Ends combat for `id` and, symmetrically, for whoever `id` was
    /// paired with.
    pub fn end(&mut self, id: &ObjectId) {
        if let Some(pairing) = self.pairs.remove(id) {
            self.pairs.remove(&pairing.target);
        }
    }

    /// Returns symmetric pairs whose next round is `<= now`, each emitted
    /// once as `(a, b)` with `a < b` by id ordering, and advances both
    /// sides' `next_round` by `round_interval`.
    pub fn rounds_due(&mut self, now: Instant, round_interval: Duration) -> Vec<(ObjectId, ObjectId)> {
        let due_ids: Vec<ObjectId> = self
            .pairs
            .iter()
            .filter(|(_, p)| p.next_round <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut seen = std::collections::HashSet::new();
        let mut due_pairs = Vec::new();
        for id in &due_ids {
            if seen.contains(id) {
                continue;
            }
            let Some(target) = self.pairs.get(id).map(|p| p.target.clone()) else {
                continue;
            };
            seen.insert(id.clone());
            seen.insert(target.clone());
            let (a, b) = if *id <= target {
                (id.clone(), target)
            } else {
                (target, id.clone())
            };
            due_pairs.push((a, b));
        }

        for id in seen.iter() {
            if let Some(pairing) = self.pairs.get_mut(id) {
                pairing.next_round = now + round_interval;
            }
        }

        due_pairs
    }

    /// Outcome of a flee attempt: probabilistically ends combat and hands
    /// back one of the candidate exits from the
    /// attacker's current room. The combat subsystem stays policy-free
    /// about what an "exit" is — the caller (an external `flee` command)
    /// supplies the candidates discovered from the room object.
    pub fn flee(
        &mut self,
        id: &ObjectId,
        exits: &[ObjectId],
        chance_percent: u8,
        rng: &mut impl Rng,
    ) -> FleeOutcome {
        let roll: u8 = rng.gen_range(0..100);
        if roll >= chance_percent {
            return FleeOutcome {
                fled: false,
                exit: None,
            };
        }
        self.end(id);
        let exit = if exits.is_empty() {
            None
        } else {
            Some(exits[rng.gen_range(0..exits.len())].clone())
        };
        FleeOutcome { fled: true, exit }
    }

    pub fn purge(&mut self, id: &ObjectId) {
        self.end(id);
    }

    /// Every symmetric pair, each emitted once as `(a, b, next_round_ms)`
    /// with `a < b` by id ordering and `next_round` expressed as an epoch
    /// millisecond offset from `now`/`now_ms` — `Instant` itself does not
    /// survive a process restart, so the snapshot stores a wall-clock
    /// offset instead.
    pub fn snapshot(&self, now: Instant, now_ms: u64) -> Vec<(ObjectId, ObjectId, u64)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for (id, pairing) in &self.pairs {
            if seen.contains(id) {
                continue;
            }
            seen.insert(id.clone());
            seen.insert(pairing.target.clone());
            let (a, b) = if *id <= pairing.target {
                (id.clone(), pairing.target.clone())
            } else {
                (pairing.target.clone(), id.clone())
            };
            let delta_ms = pairing.next_round.saturating_duration_since(now).as_millis() as u64;
            out.push((a, b, now_ms + delta_ms));
        }
        out.sort();
        out
    }

    /// Restores one symmetric pairing from a snapshot's `next_round_ms`
    /// (an epoch millisecond), converting it back to an `Instant` relative
    /// to the restoring process's own clock reading.
    pub fn restore_pair(&mut self, a: ObjectId, b: ObjectId, next_round_ms: u64, now: Instant, now_ms: u64) {
        let delta_ms = next_round_ms.saturating_sub(now_ms);
        let next_round = now + Duration::from_millis(delta_ms);
        self.pairs.insert(
            a.clone(),
            Pairing {
                target: b.clone(),
                next_round,
            },
        );
        self.pairs.insert(b, Pairing { target: a, next_round });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleeOutcome {
    pub fled: bool,
    pub exit: Option<ObjectId>,
}

#[cfg(test)]
#[path = "combat_tests.rs"]
mod tests;
