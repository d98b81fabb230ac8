// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use jit_core::StateValue;
use jit_sandbox::{build_linker, SandboxEngine, SecurityBudget};
use jit_world::host_state::HostState;
use jit_world::source::MemorySourceProvider;
use jit_world::ObjectManager;

use super::*;

fn budget() -> SecurityBudget {
    SecurityBudget {
        hook_fuel: 1_000_000,
        hook_epoch_ticks: 10_000,
        heartbeat_fuel: 1_000_000,
        heartbeat_epoch_ticks: 10_000,
    }
}

fn manager_with(source: MemorySourceProvider) -> ObjectManager {
    let sandbox = SandboxEngine::new(Duration::from_millis(5)).expect("engine");
    let linker = build_linker::<HostState>(sandbox.inner()).expect("linker");
    let invoker = jit_sandbox::SafeInvoker::new(sandbox.inner().clone(), linker, budget());
    let loader = jit_sandbox::Loader::new(sandbox.inner().clone());
    ObjectManager::new(loader, invoker, Arc::new(source))
}

const ROOM: &str = r#"
    (module
        (func $cap_room (export "cap_room"))
    )
"#;

const SWORD: &str = r#"
    (module
        (func $cap_item (export "cap_item"))
        (func $cap_equippable (export "cap_equippable"))
    )
"#;

const TROLL: &str = r#"
    (module
        (func $cap_living (export "cap_living"))
    )
"#;

const RESTORABLE_DAEMON: &str = r#"
    (module
        (func $post_restore (export "post_restore"))
        (func $cap_daemon (export "cap_daemon"))
    )
"#;

fn saved_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn world_with_fixtures() -> (WorldState, jit_core::ObjectId, jit_core::ObjectId, jit_core::ObjectId) {
    let mut source = MemorySourceProvider::new();
    source.insert("rooms/square", ROOM);
    source.insert("items/sword", SWORD);
    source.insert("mobiles/troll", TROLL);
    let mgr = manager_with(source);
    let mut world = WorldState::new(mgr);

    let now = Instant::now();
    let (room, _) = world
        .objects
        .clone_instance(&BlueprintId::new("rooms/square"), None, now, 0)
        .unwrap();
    let (sword, _) = world
        .objects
        .clone_instance(&BlueprintId::new("items/sword"), None, now, 0)
        .unwrap();
    let (troll, _) = world
        .objects
        .clone_instance(&BlueprintId::new("mobiles/troll"), None, now, 0)
        .unwrap();

    world.containment.add(room.clone(), troll.clone()).unwrap();
    world.containment.add(room.clone(), sword.clone()).unwrap();
    world
        .equipment
        .equip(&mut world.containment, troll.clone(), "wield", sword.clone())
        .unwrap();

    world.objects.get_mut(&troll).unwrap().state.set("hp", StateValue::Int(40));

    (world, room, sword, troll)
}

#[test]
fn capture_then_restore_round_trips_instances_containment_and_equipment() {
    let (mut world, room, sword, troll) = world_with_fixtures();
    let now = Instant::now();
    let snapshot = capture(&world, now, 0, saved_at());

    assert_eq!(snapshot.instances.len(), 3);
    assert_eq!(snapshot.equipment.len(), 1);
    assert_eq!(snapshot.equipment[0].wearer, troll.to_string());
    assert_eq!(snapshot.equipment[0].item, sword.to_string());

    let mut fresh_source = MemorySourceProvider::new();
    fresh_source.insert("rooms/square", ROOM);
    fresh_source.insert("items/sword", SWORD);
    fresh_source.insert("mobiles/troll", TROLL);
    let mgr = manager_with(fresh_source);
    let mut restored = WorldState::new(mgr);

    restore(&snapshot, &mut restored, Duration::from_secs(2), now, 0).expect("restore");

    assert!(restored.objects.get(&room).is_some());
    assert!(restored.objects.get(&sword).is_some());
    assert_eq!(restored.containment.get_container(&sword), Some(&troll));
    assert_eq!(restored.containment.get_container(&troll), Some(&room));
    let equipped: Vec<_> = restored.equipment.get_equipped(&troll).collect();
    assert_eq!(equipped, vec![("wield", &sword)]);

    let troll_instance = restored.objects.get(&troll).expect("troll restored");
    assert_eq!(troll_instance.state.get("hp").and_then(StateValue::as_int), Some(40));
}

#[test]
fn restore_invokes_post_restore_only_for_capable_instances() {
    let mut source = MemorySourceProvider::new();
    source.insert("daemons/clock", RESTORABLE_DAEMON);
    source.insert("items/sword", SWORD);
    let mgr = manager_with(source);
    let mut world = WorldState::new(mgr);
    let now = Instant::now();
    let (daemon, _) = world
        .objects
        .clone_instance(&BlueprintId::new("daemons/clock"), None, now, 0)
        .unwrap();
    let (sword, _) = world
        .objects
        .clone_instance(&BlueprintId::new("items/sword"), None, now, 0)
        .unwrap();

    let snapshot = capture(&world, now, 0, saved_at());

    let mut fresh_source = MemorySourceProvider::new();
    fresh_source.insert("daemons/clock", RESTORABLE_DAEMON);
    fresh_source.insert("items/sword", SWORD);
    let mut restored = WorldState::new(manager_with(fresh_source));

    restore(&snapshot, &mut restored, Duration::from_secs(2), now, 0).expect("restore");

    assert!(restored.objects.get(&daemon).is_some());
    assert!(restored.objects.get(&sword).is_some());
}

#[test]
fn combat_pairing_survives_a_round_trip_through_epoch_millis() {
    let (mut world, _room, _sword, troll) = world_with_fixtures();
    let (troll2, _) = world
        .objects
        .clone_instance(&BlueprintId::new("mobiles/troll"), None, Instant::now(), 0)
        .expect("second troll instance");

    let now = Instant::now();
    world.combat.start(troll.clone(), troll2.clone(), now, Duration::from_secs(2));
    let now_ms = 5_000u64;
    let snapshot = capture(&world, now, now_ms, saved_at());
    assert_eq!(snapshot.combat.len(), 1);

    let mut fresh_source = MemorySourceProvider::new();
    fresh_source.insert("rooms/square", ROOM);
    fresh_source.insert("items/sword", SWORD);
    fresh_source.insert("mobiles/troll", TROLL);
    let mut restored = WorldState::new(manager_with(fresh_source));
    restore(&snapshot, &mut restored, Duration::from_secs(2), now, now_ms).expect("restore");

    assert!(restored.combat.is_in_combat(&troll));
    assert!(restored.combat.is_in_combat(&troll2));
    assert_eq!(restored.combat.target(&troll), Some(&troll2));
}

#[test]
fn save_then_load_round_trips_through_disk() {
    let (world, _room, _sword, _troll) = world_with_fixtures();
    let now = Instant::now();
    let snapshot = capture(&world, now, 0, saved_at());

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("world.json");
    save(&path, &snapshot).expect("save");

    let loaded = load(&path).expect("load").expect("present");
    assert_eq!(loaded.instances.len(), snapshot.instances.len());
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);

    assert!(crate::breadcrumb::scan_for_orphan(&path).is_none(), "clean save leaves no breadcrumb");
}

#[test]
fn load_of_missing_path_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("does-not-exist.json");
    assert!(load(&path).expect("load ok").is_none());
}
