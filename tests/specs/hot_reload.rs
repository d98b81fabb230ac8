// SPDX-License-Identifier: MIT

//! Scenario: hot reload preserves state.

use std::time::{Duration, Instant};

use jit_core::{BlueprintId, StateValue};

use crate::prelude::world_with;

const TIME_D: &str = r#"
    (module
        (func $on_load (export "on_load"))
        (func $on_reload (export "on_reload"))
        (func $cap_daemon (export "cap_daemon"))
    )
"#;

#[test]
fn reload_preserves_state_store_byte_for_byte() {
    let mut world = world_with(&[("daemons/time_d", TIME_D)]);
    let now = Instant::now();
    let blueprint = BlueprintId::new("daemons/time_d");
    let (time_d, _) = world.spawn(&blueprint, None, Duration::from_secs(10), now, 0).unwrap();

    {
        let instance = world.objects.get_mut(&time_d).unwrap();
        instance.state.set("hour", StateValue::Int(14));
        instance.state.set("minute", StateValue::Int(30));
    }

    let before = world.objects.get(&time_d).unwrap().state.clone();
    let results = world.objects.reload(&blueprint, now, 0).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, time_d);
    let after = world.objects.get(&time_d).unwrap().state.clone();
    assert_eq!(before, after);
    assert_eq!(after.get("hour").and_then(StateValue::as_int), Some(14));
    assert_eq!(after.get("minute").and_then(StateValue::as_int), Some(30));
}

#[test]
fn reload_on_n_instances_leaves_n_instances_with_unchanged_ids() {
    let mut world = world_with(&[("daemons/time_d", TIME_D)]);
    let now = Instant::now();
    let blueprint = BlueprintId::new("daemons/time_d");

    let (a, _) = world.spawn(&blueprint, None, Duration::from_secs(10), now, 0).unwrap();
    let (b, _) = world.spawn(&blueprint, None, Duration::from_secs(10), now, 0).unwrap();

    let results = world.objects.reload(&blueprint, now, 0).unwrap();
    let reloaded: Vec<_> = results.into_iter().map(|(id, _)| id).collect();

    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.contains(&a));
    assert!(reloaded.contains(&b));
}
