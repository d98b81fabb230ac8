// SPDX-License-Identifier: MIT

//! Behavioral capability set: a tagged bitset per instance, computed once at
//! load time from the blueprint's export list (see `jit-sandbox`'s loader),
//! standing in for dynamic-language type-based interface checks.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const ROOM        = 1 << 0;
        const ITEM        = 1 << 1;
        const LIVING      = 1 << 2;
        const CARRYABLE   = 1 << 3;
        const EQUIPPABLE  = 1 << 4;
        const WEAPON      = 1 << 5;
        const ARMOUR      = 1 << 6;
        const CONSUMABLE  = 1 << 7;
        const READABLE    = 1 << 8;
        const SPAWNER     = 1 << 9;
        const HEARTBEAT   = 1 << 10;
        const RESETTABLE  = 1 << 11;
        const ON_ENTER    = 1 << 12;
        const ON_LEAVE    = 1 << 13;
        const ON_RELOAD   = 1 << 14;
        const DAEMON      = 1 << 15;
        const AI_NPC      = 1 << 16;
        const ON_LOAD     = 1 << 17;
        const ON_DESTRUCT = 1 << 18;
        /// Fired once per instance after a snapshot restore, never during
        /// ordinary `clone` (that path uses `ON_LOAD` instead).
        const POST_RESTORE = 1 << 19;
    }
}

impl Capabilities {
    pub fn satisfies(&self, other: Capabilities) -> bool {
        self.contains(other)
    }
}
