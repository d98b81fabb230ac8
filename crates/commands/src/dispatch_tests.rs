// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};

use jit_core::{BlueprintId, RoomEvent, RoomEventKind};
use jit_sandbox::{build_linker, Loader, SafeInvoker, SandboxEngine, SecurityBudget};
use jit_world::{HostState, MemorySourceProvider, ObjectManager};

use crate::registry::CommandSpec;

use super::*;

fn budget() -> SecurityBudget {
    SecurityBudget {
        hook_fuel: 1_000_000,
        hook_epoch_ticks: 10_000,
        heartbeat_fuel: 1_000_000,
        heartbeat_epoch_ticks: 10_000,
    }
}

const ROOM: &str = r#"(module (func $cap_room (export "cap_room")))"#;
const PLAYER: &str = r#"(module (func $cap_living (export "cap_living")))"#;
const SHOP: &str = r#"(module (func $buy (export "buy")) (func $cap_item (export "cap_item")))"#;
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

fn looking_glass_spec() -> CommandSpec {
    CommandSpec {
        name: "wave".to_string(),
        aliases: vec!["w".to_string()],
        category: "social".to_string(),
        usage: "wave".to_string(),
        description: "wave at the room".to_string(),
        wizard_only: false,
        execute: Arc::new(|ctx, _args| {
            ctx.tell("You wave.");
            ctx.emit_room_event(RoomEvent::new(RoomEventKind::Emote, ctx.actor.clone(), ctx.actor_name.clone()).with_message("waves"));
            Ok(())
        }),
    }
}

#[test]
fn dispatches_a_global_command_by_exact_name() {
    let mut world = world_with(&[("rooms/square", ROOM), ("players/aldric", PLAYER)]);
    let now = Instant::now();
    let (square, _) = world.objects.clone_instance(&BlueprintId::new("rooms/square"), None, now, 0).unwrap();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();
    world.containment.add(square, aldric.clone()).unwrap();

    let mut registry = CommandRegistry::new();
    registry.register(looking_glass_spec()).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let outcome = dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "wave", now, 0).unwrap();
    assert_eq!(outcome.lines, vec!["You wave."]);
}

#[test]
fn dispatches_a_global_command_by_alias() {
    let mut world = world_with(&[("players/aldric", PLAYER)]);
    let now = Instant::now();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();

    let mut registry = CommandRegistry::new();
    registry.register(looking_glass_spec()).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let outcome = dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "w", now, 0).unwrap();
    assert_eq!(outcome.lines, vec!["You wave."]);
}

#[test]
fn unknown_word_with_no_local_match_is_unknown_command() {
    let mut world = world_with(&[("players/aldric", PLAYER)]);
    let now = Instant::now();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();

    let dispatcher = Dispatcher::new(CommandRegistry::new());
    let err = dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "frobnicate", now, 0).unwrap_err();
    assert_eq!(err, CommandError::Unknown("frobnicate".to_string()));
}

#[test]
fn falls_back_to_a_local_command_advertised_by_a_room_object() {
    let mut world = world_with(&[("rooms/square", ROOM), ("players/aldric", PLAYER), ("shops/armoury", SHOP)]);
    let now = Instant::now();
    let (square, _) = world.objects.clone_instance(&BlueprintId::new("rooms/square"), None, now, 0).unwrap();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();
    let (armoury, _) = world.objects.clone_instance(&BlueprintId::new("shops/armoury"), None, now, 0).unwrap();
    world.containment.add(square.clone(), aldric.clone()).unwrap();
    world.containment.add(square, armoury).unwrap();

    let dispatcher = Dispatcher::new(CommandRegistry::new());
    let outcome = dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "buy", now, 0).unwrap();
    assert!(outcome.lines.is_empty());
}

#[test]
fn falls_back_to_a_local_command_advertised_by_an_inventory_item() {
    let mut world = world_with(&[("players/aldric", PLAYER), ("shops/armoury", SHOP)]);
    let now = Instant::now();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();
    let (armoury, _) = world.objects.clone_instance(&BlueprintId::new("shops/armoury"), None, now, 0).unwrap();
    world.containment.add(aldric.clone(), armoury).unwrap();

    let dispatcher = Dispatcher::new(CommandRegistry::new());
    let outcome = dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "buy", now, 0).unwrap();
    assert!(outcome.lines.is_empty());
}

#[test]
fn wizard_only_command_is_unreachable_for_non_wizards() {
    let mut world = world_with(&[("players/aldric", PLAYER)]);
    let now = Instant::now();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();

    let mut registry = CommandRegistry::new();
    registry
        .register(CommandSpec {
            name: "shutdown".to_string(),
            aliases: vec![],
            category: "wizard".to_string(),
            usage: "shutdown".to_string(),
            description: String::new(),
            wizard_only: true,
            execute: Arc::new(|_ctx, _args| Ok(())),
        })
        .unwrap();
    let dispatcher = Dispatcher::new(registry);

    let err = dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "shutdown", now, 0).unwrap_err();
    assert_eq!(err, CommandError::Unknown("shutdown".to_string()));
}

#[test]
fn room_event_reaches_ai_npc_observers_but_not_the_actor() {
    let mut world = world_with(&[("rooms/square", ROOM), ("players/aldric", PLAYER), ("npcs/watcher", WATCHER)]);
    let now = Instant::now();
    let (square, _) = world.objects.clone_instance(&BlueprintId::new("rooms/square"), None, now, 0).unwrap();
    let (aldric, _) = world.objects.clone_instance(&BlueprintId::new("players/aldric"), None, now, 0).unwrap();
    let (watcher, _) = world.objects.clone_instance(&BlueprintId::new("npcs/watcher"), None, now, 0).unwrap();
    world.containment.add(square.clone(), aldric.clone()).unwrap();
    world.containment.add(square, watcher.clone()).unwrap();

    let mut registry = CommandRegistry::new();
    registry.register(looking_glass_spec()).unwrap();
    let dispatcher = Dispatcher::new(registry);

    dispatcher.dispatch(&mut world, &aldric, "Aldric", false, "wave", now, 0).unwrap();
    assert!(world.objects.get(&watcher).is_some());
}
