// SPDX-License-Identifier: MIT

//! Blueprint: the isolated, collectible code unit produced by the loader.

use std::time::Instant;

use jit_core::{BlueprintId, Capabilities};
use wasmtime::Module;

pub const HOOK_ON_LOAD: &str = "on_load";
pub const HOOK_ON_DESTRUCT: &str = "on_destruct";
pub const HOOK_ON_ENTER: &str = "on_enter";
pub const HOOK_ON_LEAVE: &str = "on_leave";
pub const HOOK_ON_RELOAD: &str = "on_reload";
pub const HOOK_HEARTBEAT: &str = "heartbeat";
pub const HOOK_POST_RESTORE: &str = "post_restore";

const WELL_KNOWN_HOOKS: &[&str] = &[
    HOOK_ON_LOAD,
    HOOK_ON_DESTRUCT,
    HOOK_ON_ENTER,
    HOOK_ON_LEAVE,
    HOOK_ON_RELOAD,
    HOOK_HEARTBEAT,
    HOOK_POST_RESTORE,
];

/// Immutable descriptor of loaded code. A blueprint's `Module` can be
/// dropped independently of any live instance — capability and method-table
/// data is copied out at load time so unload doesn't need to keep the
/// module alive for bookkeeping.
#[derive(Clone)]
pub struct Blueprint {
    pub id: BlueprintId,
    pub module: Module,
    pub loaded_at: Instant,
    /// `loaded_at` in epoch milliseconds, the form `on_reload`'s
    /// `previousBlueprintTimestamp` argument needs.
    pub loaded_at_ms: u64,
    pub capabilities: Capabilities,
    /// Every exported function name not among the well-known hooks —
    /// the method table used by callouts and local commands.
    pub methods: Vec<String>,
}

impl Blueprint {
    pub fn exports_hook(&self, name: &str) -> bool {
        self.module.get_export(name).is_some()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }
}

pub(crate) fn capabilities_from_exports(module: &Module) -> (Capabilities, Vec<String>) {
    let mut caps = Capabilities::empty();
    let mut methods = Vec::new();
    for export in module.exports() {
        let name = export.name();
        if !export.ty().func().is_some() {
            continue;
        }
        match name {
            HOOK_ON_LOAD => caps |= Capabilities::ON_LOAD,
            HOOK_ON_DESTRUCT => caps |= Capabilities::ON_DESTRUCT,
            HOOK_ON_ENTER => caps |= Capabilities::ON_ENTER,
            HOOK_ON_LEAVE => caps |= Capabilities::ON_LEAVE,
            HOOK_ON_RELOAD => caps |= Capabilities::ON_RELOAD,
            HOOK_HEARTBEAT => caps |= Capabilities::HEARTBEAT,
            HOOK_POST_RESTORE => caps |= Capabilities::POST_RESTORE,
            "cap_room" => caps |= Capabilities::ROOM,
            "cap_item" => caps |= Capabilities::ITEM,
            "cap_living" => caps |= Capabilities::LIVING,
            "cap_carryable" => caps |= Capabilities::CARRYABLE,
            "cap_equippable" => caps |= Capabilities::EQUIPPABLE,
            "cap_weapon" => caps |= Capabilities::WEAPON,
            "cap_armour" => caps |= Capabilities::ARMOUR,
            "cap_consumable" => caps |= Capabilities::CONSUMABLE,
            "cap_readable" => caps |= Capabilities::READABLE,
            "cap_spawner" => caps |= Capabilities::SPAWNER,
            "cap_resettable" => caps |= Capabilities::RESETTABLE,
            "cap_daemon" => caps |= Capabilities::DAEMON,
            "cap_ai_npc" => caps |= Capabilities::AI_NPC,
            other if !WELL_KNOWN_HOOKS.contains(&other) => methods.push(other.to_string()),
            _ => {}
        }
    }
    (caps, methods)
}

pub(crate) fn count_on_load_like_exports(module: &Module) -> usize {
    module
        .exports()
        .filter(|e| e.ty().func().is_some() && e.name().starts_with(HOOK_ON_LOAD))
        .count()
}
