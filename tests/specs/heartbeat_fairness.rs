// SPDX-License-Identifier: MIT

//! Scenario: heartbeat fairness across independently-clocked registrants.

use std::time::{Duration, Instant};

use jit_world::HeartbeatScheduler;

#[test]
fn fast_and_slow_objects_fire_on_their_own_cadence() {
    let mut scheduler = HeartbeatScheduler::new();
    let start = Instant::now();
    let x = jit_core::ObjectId::new(jit_core::BlueprintId::new("npcs/x"), 1);
    let y = jit_core::ObjectId::new(jit_core::BlueprintId::new("npcs/y"), 1);

    scheduler.register(x.clone(), Duration::from_secs(1), start);
    scheduler.register(y.clone(), Duration::from_secs(3), start);

    let mut fired_at = Vec::new();
    let mut now = start;
    for _ in 0..3 {
        now += Duration::from_secs(1);
        fired_at.push((now, scheduler.due(now)));
    }

    assert!(fired_at[0].1.contains(&x));
    assert!(!fired_at[0].1.contains(&y));
    assert!(fired_at[1].1.contains(&x));
    assert!(!fired_at[1].1.contains(&y));
    assert!(fired_at[2].1.contains(&x));
    assert!(fired_at[2].1.contains(&y));
}
