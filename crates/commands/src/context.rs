// SPDX-License-Identifier: MIT

//! `CommandContext`: player id, session, world state, output sink, and
//! helpers for a command's execute function. Built fresh by the
//! dispatcher for a single command execution, never retained.

use std::time::Instant;

use jit_core::{ObjectId, RoomEvent};
use jit_world::WorldState;

/// Everything a command's execute function needs. Output is collected into
/// an owned buffer rather than written directly to a socket — the session
/// layer owns the per-session output mutex and CRLF framing, so commands
/// only ever produce lines, never bytes.
pub struct CommandContext<'w> {
    pub actor: ObjectId,
    pub actor_name: String,
    pub wizard: bool,
    pub world: &'w mut WorldState,
    pub now: Instant,
    pub now_ms: u64,
    output: Vec<String>,
    room_event: Option<RoomEvent>,
    disconnect: bool,
}

impl<'w> CommandContext<'w> {
    pub fn new(actor: ObjectId, actor_name: impl Into<String>, wizard: bool, world: &'w mut WorldState, now: Instant, now_ms: u64) -> Self {
        Self {
            actor,
            actor_name: actor_name.into(),
            wizard,
            world,
            now,
            now_ms,
            output: Vec::new(),
            room_event: None,
            disconnect: false,
        }
    }

    /// Queues one line of output to the actor's own session.
    pub fn tell(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Records the room event the dispatcher should fan out to AI-NPC
    /// observers once this command finishes. At most one event per
    /// command; a later call overwrites an earlier one.
    pub fn emit_room_event(&mut self, event: RoomEvent) {
        self.room_event = Some(event);
    }

    /// Marks this session for closure once the dispatcher finishes running
    /// the current command (`quit`, and wizard `shutdown` for the session
    /// that issued it). The session layer owns the actual teardown.
    pub fn request_disconnect(&mut self) {
        self.disconnect = true;
    }

    pub fn into_parts(self) -> (Vec<String>, Option<RoomEvent>, bool) {
        (self.output, self.room_event, self.disconnect)
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }
}
