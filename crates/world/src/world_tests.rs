// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use jit_core::{BlueprintId, RoomEvent, RoomEventKind};
use jit_sandbox::{build_linker, Loader, SafeInvoker, SandboxEngine, SecurityBudget};

use crate::host_state::HostState;
use crate::manager::ObjectManager;
use crate::source::MemorySourceProvider;

use super::*;

fn budget() -> SecurityBudget {
    SecurityBudget {
        hook_fuel: 1_000_000,
        hook_epoch_ticks: 10_000,
        heartbeat_fuel: 1_000_000,
        heartbeat_epoch_ticks: 10_000,
    }
}

const ROOM: &str = r#"
    (module
        (func $cap_room (export "cap_room"))
        (func $on_enter (export "on_enter"))
        (func $on_leave (export "on_leave"))
    )
"#;

const SWORD: &str = r#"(module (func $cap_item (export "cap_item")))"#;

const WATCHER: &str = r#"
    (module
        (func $cap_ai_npc (export "cap_ai_npc"))
        (func $on_room_event (export "on_room_event"))
    )
"#;

fn world_with(entries: &[(&str, &str)]) -> WorldState {
    let mut source = MemorySourceProvider::new();
    for (id, src) in entries {
        source.insert(*id, *src);
    }
    let sandbox = SandboxEngine::new(Duration::from_millis(5)).expect("engine");
    let linker = build_linker::<HostState>(sandbox.inner()).expect("linker");
    let invoker = SafeInvoker::new(sandbox.inner().clone(), linker, budget());
    let loader = Loader::new(sandbox.inner().clone());
    let objects = ObjectManager::new(loader, invoker, Arc::new(source));
    WorldState::new(objects)
}

#[test]
fn move_into_non_room_does_not_fire_enter_leave_but_still_moves() {
    let mut world = world_with(&[("rooms/square", ROOM), ("items/sword", SWORD)]);
    let now = Instant::now();
    let (square, _) = world
        .objects
        .clone_instance(&BlueprintId::new("rooms/square"), None, now, 0)
        .unwrap();
    let (sword, _) = world
        .objects
        .clone_instance(&BlueprintId::new("items/sword"), None, now, 0)
        .unwrap();

    world.move_object(sword.clone(), square.clone(), now, 0).expect("moves");
    assert_eq!(world.containment.get_container(&sword), Some(&square));
}

#[test]
fn move_between_two_rooms_fires_leave_then_enter() {
    let mut world = world_with(&[
        ("rooms/a", ROOM),
        ("rooms/b", ROOM),
        ("items/sword", SWORD),
    ]);
    let now = Instant::now();
    let (a, _) = world.objects.clone_instance(&BlueprintId::new("rooms/a"), None, now, 0).unwrap();
    let (b, _) = world.objects.clone_instance(&BlueprintId::new("rooms/b"), None, now, 0).unwrap();
    let (sword, _) = world
        .objects
        .clone_instance(&BlueprintId::new("items/sword"), None, now, 0)
        .unwrap();

    world.move_object(sword.clone(), a.clone(), now, 0).unwrap();
    world.move_object(sword.clone(), b.clone(), now, 0).expect("crosses rooms");
    assert_eq!(world.containment.get_container(&sword), Some(&b));
    assert!(world.containment.get_contents(&a).is_empty());
}

#[test]
fn cycle_rejected_and_containment_is_unchanged() {
    let mut world = world_with(&[("containers/a", SWORD), ("containers/b", SWORD)]);
    let now = Instant::now();
    let (a, _) = world.objects.clone_instance(&BlueprintId::new("containers/a"), None, now, 0).unwrap();
    let (b, _) = world.objects.clone_instance(&BlueprintId::new("containers/b"), None, now, 0).unwrap();

    world.move_object(b.clone(), a.clone(), now, 0).unwrap();
    let err = world.move_object(a.clone(), b.clone(), now, 0).unwrap_err();
    assert!(matches!(err, ContainmentError::Cycle { .. }));
    assert_eq!(world.containment.get_container(&b), Some(&a));
}

#[test]
fn destruct_purges_containment_equipment_combat_and_schedules() {
    let mut world = world_with(&[("rooms/square", ROOM), ("items/sword", SWORD)]);
    let now = Instant::now();
    let (square, _) = world.objects.clone_instance(&BlueprintId::new("rooms/square"), None, now, 0).unwrap();
    let (sword, _) = world.objects.clone_instance(&BlueprintId::new("items/sword"), None, now, 0).unwrap();
    world.containment.add(square.clone(), sword.clone()).unwrap();
    world.heartbeat.register(sword.clone(), Duration::from_secs(1), now);
    world
        .callouts
        .schedule(sword.clone(), "decay", Duration::from_secs(1), Vec::new(), now);

    world.destruct(&sword, 0).expect("destructs");

    assert!(world.containment.get_container(&sword).is_none());
    assert!(world.containment.get_contents(&square).is_empty());
    assert!(!world.heartbeat.is_registered(&sword));
    assert!(world.callouts.is_empty());
    assert!(world.objects.get(&sword).is_none());
}

#[test]
fn room_event_reaches_ai_npc_observers_but_skips_the_actor() {
    let mut world = world_with(&[
        ("rooms/square", ROOM),
        ("npcs/watcher", WATCHER),
        ("items/sword", SWORD),
    ]);
    let now = Instant::now();
    let (square, _) = world.objects.clone_instance(&BlueprintId::new("rooms/square"), None, now, 0).unwrap();
    let (watcher, _) = world.objects.clone_instance(&BlueprintId::new("npcs/watcher"), None, now, 0).unwrap();
    let (actor, _) = world.objects.clone_instance(&BlueprintId::new("items/sword"), None, now, 0).unwrap();
    world.containment.add(square.clone(), watcher.clone()).unwrap();
    world.containment.add(square.clone(), actor.clone()).unwrap();

    let event = RoomEvent::new(RoomEventKind::Speech, actor.clone(), "Aldric").with_message("hello");
    world.fire_room_event(&square, &event, now, 0);

    // Best-effort delivery: no panic, and the actor itself was never a
    // candidate observer (it lacks the AI_NPC capability anyway).
    assert!(world.objects.get(&watcher).is_some());
    assert!(world.objects.get(&actor).is_some());
}
