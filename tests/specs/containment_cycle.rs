// SPDX-License-Identifier: MIT

//! Scenario: containment cycle rejected.

use std::time::{Duration, Instant};

use jit_core::BlueprintId;

use crate::prelude::world_with;

const BAG: &str = r#"
    (module
        (func $on_load (export "on_load"))
        (func $cap_container (export "cap_container"))
    )
"#;

#[test]
fn second_move_forming_a_cycle_is_rejected_and_state_is_unchanged() {
    let mut world = world_with(&[("items/bag", BAG)]);
    let now = Instant::now();
    let blueprint = BlueprintId::new("items/bag");
    let (a, _) = world.spawn(&blueprint, None, Duration::from_secs(10), now, 0).unwrap();
    let (b, _) = world.spawn(&blueprint, None, Duration::from_secs(10), now, 0).unwrap();

    world.move_object(a.clone(), b.clone(), now, 0).unwrap();
    let snapshot_before = world.containment.get_container(&b).cloned();

    let result = world.move_object(b.clone(), a.clone(), now, 0);
    assert!(result.is_err());
    assert_eq!(world.containment.get_container(&b).cloned(), snapshot_before);
    assert_eq!(world.containment.get_container(&a), Some(&b));
}
