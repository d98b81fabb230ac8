// SPDX-License-Identifier: MIT

//! Scenario: clone, move, destruct.

use std::time::{Duration, Instant};

use jit_core::{BlueprintId, StateValue};

use crate::prelude::world_with;

const RUSTY_SWORD: &str = r#"
    (module
        (func $on_load (export "on_load"))
        (func $on_destruct (export "on_destruct"))
        (func $cap_item (export "cap_item"))
    )
"#;

const ROOM: &str = r#"
    (module
        (func $on_enter (export "on_enter"))
        (func $on_leave (export "on_leave"))
        (func $cap_room (export "cap_room"))
    )
"#;

#[test]
fn clone_move_destruct_round_trip() {
    let mut world = world_with(&[("items/rusty_sword", RUSTY_SWORD), ("rooms/town_square", ROOM)]);
    let now = Instant::now();

    let (room, _) = world.spawn(&BlueprintId::new("rooms/town_square"), None, Duration::from_secs(10), now, 0).unwrap();
    let (sword, _) = world.spawn(&BlueprintId::new("items/rusty_sword"), None, Duration::from_secs(10), now, 0).unwrap();
    assert_eq!(sword.to_string(), "items/rusty_sword#000001");

    world.move_object(sword.clone(), room.clone(), now, 0).unwrap();
    assert!(world.containment.get_contents(&room).contains(&sword));

    world.destruct(&sword, 0).unwrap();
    assert!(!world.containment.get_contents(&room).contains(&sword));
    assert!(world.objects.get(&sword).is_none());
}

#[test]
fn state_store_survives_until_destruct() {
    let mut world = world_with(&[("items/rusty_sword", RUSTY_SWORD)]);
    let now = Instant::now();
    let (sword, _) = world.spawn(&BlueprintId::new("items/rusty_sword"), None, Duration::from_secs(10), now, 0).unwrap();

    world.objects.get_mut(&sword).unwrap().state.set("sharpness", StateValue::Int(7));
    assert_eq!(world.objects.get(&sword).unwrap().state.get("sharpness").and_then(StateValue::as_int), Some(7));
}
