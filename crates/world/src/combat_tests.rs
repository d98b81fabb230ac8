// SPDX-License-Identifier: MIT

use jit_core::BlueprintId;
use rand::rngs::mock::StepRng;

use super::*;

fn oid(bp: &str, ordinal: u32) -> ObjectId {
    ObjectId::new(BlueprintId::new(bp), ordinal)
}

#[test]
fn start_creates_symmetric_pairing() {
    let mut combat = CombatRegistry::new();
    let now = Instant::now();
    let a = oid("players/alice", 1);
    let b = oid("mobs/goblin", 1);
    combat.start(a.clone(), b.clone(), now, Duration::from_secs(2));

    assert!(combat.is_in_combat(&a));
    assert!(combat.is_in_combat(&b));
    assert_eq!(combat.target(&a), Some(&b));
    assert_eq!(combat.target(&b), Some(&a));
}

#[test]
fn end_clears_both_sides_of_the_pairing() {
    let mut combat = CombatRegistry::new();
    let now = Instant::now();
    let a = oid("players/alice", 1);
    let b = oid("mobs/goblin", 1);
    combat.start(a.clone(), b.clone(), now, Duration::from_secs(2));

    combat.end(&a);
    assert!(!combat.is_in_combat(&a));
    assert!(!combat.is_in_combat(&b));
}

#[test]
fn rounds_due_emits_each_pair_once() {
    let mut combat = CombatRegistry::new();
    let now = Instant::now();
    let a = oid("players/alice", 1);
    let b = oid("mobs/goblin", 1);
    combat.start(a.clone(), b.clone(), now, Duration::from_secs(2));

    let due = combat.rounds_due(now + Duration::from_secs(2), Duration::from_secs(2));
    assert_eq!(due.len(), 1);
    assert!(due[0] == (a.clone(), b.clone()) || due[0] == (b, a));
}

#[test]
fn rounds_due_reschedules_next_round() {
    let mut combat = CombatRegistry::new();
    let now = Instant::now();
    let a = oid("players/alice", 1);
    let b = oid("mobs/goblin", 1);
    combat.start(a.clone(), b.clone(), now, Duration::from_secs(2));

    combat.rounds_due(now + Duration::from_secs(2), Duration::from_secs(2));
    assert!(combat.rounds_due(now + Duration::from_secs(3), Duration::from_secs(2)).is_empty());
    assert_eq!(
        combat.rounds_due(now + Duration::from_secs(4), Duration::from_secs(2)).len(),
        1
    );
}

#[test]
fn flee_always_succeeds_ends_combat_and_returns_an_exit_when_roll_is_low() {
    let mut combat = CombatRegistry::new();
    let now = Instant::now();
    let a = oid("players/alice", 1);
    let b = oid("mobs/goblin", 1);
    combat.start(a.clone(), b.clone(), now, Duration::from_secs(2));

    let exits = vec![oid("rooms/north", 1), oid("rooms/south", 1)];
    let mut rng = StepRng::new(0, 1);
    let outcome = combat.flee(&a, &exits, 100, &mut rng);

    assert!(outcome.fled);
    assert!(outcome.exit.is_some());
    assert!(!combat.is_in_combat(&a));
    assert!(!combat.is_in_combat(&b));
}

#[test]
fn flee_fails_and_leaves_combat_intact_when_chance_is_zero() {
    let mut combat = CombatRegistry::new();
    let now = Instant::now();
    let a = oid("players/alice", 1);
    let b = oid("mobs/goblin", 1);
    combat.start(a.clone(), b.clone(), now, Duration::from_secs(2));

    let exits = vec![oid("rooms/north", 1)];
    let mut rng = StepRng::new(0, 1);
    let outcome = combat.flee(&a, &exits, 0, &mut rng);

    assert!(!outcome.fled);
    assert!(outcome.exit.is_none());
    assert!(combat.is_in_combat(&a));
}
