// SPDX-License-Identifier: MIT

//! Host-side context threaded into every `wasmtime::Store`. World code can
//! only reach the driver through the functions linked from this trait —
//! anything else (file IO, sockets, process control) is simply never
//! linked, so instantiation fails outright rather than needing an
//! allowlist to bypass.

/// Implemented by `jit-world`'s per-instance host state. Kept in
/// `jit-sandbox` (not `jit-world`) so the dependency edge stays acyclic:
/// `jit-sandbox` defines the seam, `jit-world` implements it.
pub trait HostContext: Send + 'static {
    /// The calling instance's own id, for self-scoped state/log calls.
    fn self_id(&self) -> String;

    fn state_get(&mut self, key: &str) -> Option<String>;
    fn state_set(&mut self, key: &str, value: String);
    fn state_has(&mut self, key: &str) -> bool;

    /// Is `other` in this instance's room (or is this instance's container)?
    fn is_in_room(&mut self, other: &str) -> bool;

    fn log(&mut self, message: &str);
    fn now_ms(&mut self) -> u64;

    /// The previous blueprint's load timestamp, in epoch milliseconds, only
    /// set for the call frame that invokes `on_reload` with
    /// `previousBlueprintTimestamp`. `None` for every other hook.
    fn prev_reload_ms(&mut self) -> Option<u64>;

    /// The room event this call frame is delivering to an AI-NPC observer,
    /// as a fixed small integer tag. `None` outside a room-event fan-out
    /// call. Tag assignment lives in `jit-commands` (the only
    /// producer of `RoomEvent`s) so `jit-sandbox` stays free of a
    /// dependency on `jit-core`'s event module beyond these plain values.
    fn room_event_kind(&mut self) -> Option<i32>;
    fn room_event_actor(&mut self) -> Option<String>;
    fn room_event_message(&mut self) -> Option<String>;

    fn schedule_callout(&mut self, method: &str, after_ms: u64, repeat: bool, interval_ms: u64);
}
