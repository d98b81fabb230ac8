// SPDX-License-Identifier: MIT

//! Scenario: callout cancels on destruct.

use std::time::{Duration, Instant};

use jit_core::{BlueprintId, ObjectId};

use crate::prelude::world_with;

const WATCHER: &str = r#"
    (module
        (func $on_load (export "on_load"))
        (func $on_destruct (export "on_destruct"))
        (func $tick (export "tick"))
        (func $cap_item (export "cap_item"))
    )
"#;

#[test]
fn destructing_the_target_stops_further_invocations() {
    let mut world = world_with(&[("items/watcher", WATCHER)]);
    let start = Instant::now();
    let blueprint = BlueprintId::new("items/watcher");
    let (id, _) = world.spawn(&blueprint, None, Duration::from_secs(60), start, 0).unwrap();

    world.callouts.schedule_every(id.clone(), "tick", Duration::from_secs(2), Vec::new(), start);

    let mut invocation_count = 0u32;
    let mut now = start;
    for elapsed_secs in 1..=3u64 {
        now = start + Duration::from_secs(elapsed_secs);
        for callout in world.callouts.due(now) {
            invocation_count += 1;
            world.fire_callout(&callout, now, 0);
        }
    }
    assert_eq!(invocation_count, 1, "callout should have fired once by 3s (every 2s)");

    world.destruct(&id, 0).unwrap();

    for elapsed_secs in 4..=10u64 {
        now = start + Duration::from_secs(elapsed_secs);
        let due: Vec<ObjectId> = world.callouts.due(now).into_iter().map(|c| c.target).collect();
        assert!(!due.contains(&id), "destructed object must not still be scheduled");
    }
}
