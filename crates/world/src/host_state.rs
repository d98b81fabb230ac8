// SPDX-License-Identifier: MIT

//! Per-call host state. Built fresh before every safe-invoker call from
//! the instance's persisted state and drained back afterwards; world code
//! never holds a reference into the shared world-state critical section
//! while it runs.

use jit_core::{StateStore, StateValue};
use jit_sandbox::HostContext;

#[derive(Debug, Clone)]
pub struct PendingCallout {
    pub method: String,
    pub after_ms: u64,
    pub repeat: bool,
    pub interval_ms: u64,
}

/// A room event flattened to the three fields a call frame needs
/// to hand to an AI-NPC observer: an integer kind tag (assigned by
/// `jit-commands`, the only producer), the actor id, and an optional
/// message.
#[derive(Debug, Clone)]
pub struct RoomEventFrame {
    pub kind: i32,
    pub actor: String,
    pub message: Option<String>,
}

pub struct HostState {
    self_id: String,
    pub state: StateStore,
    room_members: Vec<String>,
    now_ms: u64,
    prev_reload_ms: Option<u64>,
    room_event: Option<RoomEventFrame>,
    pub pending_callouts: Vec<PendingCallout>,
}

impl HostState {
    pub fn new(self_id: String, state: StateStore, room_members: Vec<String>, now_ms: u64) -> Self {
        Self {
            self_id,
            state,
            room_members,
            now_ms,
            prev_reload_ms: None,
            room_event: None,
            pending_callouts: Vec::new(),
        }
    }

    /// Used for the single call frame that invokes `on_reload`.
    pub fn with_prev_reload_ms(mut self, prev_reload_ms: u64) -> Self {
        self.prev_reload_ms = Some(prev_reload_ms);
        self
    }

    /// Used for the call frame that fans a room event out to an AI-NPC
    /// observer.
    pub fn with_room_event(mut self, frame: RoomEventFrame) -> Self {
        self.room_event = Some(frame);
        self
    }
}

impl HostContext for HostState {
    fn self_id(&self) -> String {
        self.self_id.clone()
    }

    fn state_get(&mut self, key: &str) -> Option<String> {
        self.state.get(key).and_then(|v| match v {
            StateValue::Str(s) => Some(s.clone()),
            StateValue::Int(i) => Some(i.to_string()),
            StateValue::Bool(b) => Some(b.to_string()),
            StateValue::Timestamp(t) => Some(t.to_string()),
            StateValue::Blob(_) => None,
        })
    }

    fn state_set(&mut self, key: &str, value: String) {
        self.state.set(key.to_string(), StateValue::Str(value));
    }

    fn state_has(&mut self, key: &str) -> bool {
        self.state.has(key)
    }

    fn is_in_room(&mut self, other: &str) -> bool {
        self.room_members.iter().any(|m| m == other)
    }

    fn log(&mut self, message: &str) {
        tracing::info!(target: "jit_world::wasm", object = %self.self_id, "{message}");
    }

    fn now_ms(&mut self) -> u64 {
        self.now_ms
    }

    fn prev_reload_ms(&mut self) -> Option<u64> {
        self.prev_reload_ms
    }

    fn room_event_kind(&mut self) -> Option<i32> {
        self.room_event.as_ref().map(|e| e.kind)
    }

    fn room_event_actor(&mut self) -> Option<String> {
        self.room_event.as_ref().map(|e| e.actor.clone())
    }

    fn room_event_message(&mut self) -> Option<String> {
        self.room_event.as_ref().and_then(|e| e.message.clone())
    }

    fn schedule_callout(&mut self, method: &str, after_ms: u64, repeat: bool, interval_ms: u64) {
        self.pending_callouts.push(PendingCallout {
            method: method.to_string(),
            after_ms,
            repeat,
            interval_ms,
        });
    }
}
