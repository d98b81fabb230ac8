// SPDX-License-Identifier: MIT

//! Room events and message-queue entries: the two structured notifications
//! that cross a component boundary. A room event fans out from the command
//! dispatcher to AI-NPC observers; a message fans out from anywhere into
//! the session layer.

use serde::{Deserialize, Serialize};

use crate::id::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomEventKind {
    Speech,
    Emote,
    ItemDropped,
    ItemGiven,
    Arrival,
    Departure,
    Combat,
    Custom,
}

/// A structured notification fanned out to AI-NPC observers in a room after
/// a player (or world code) action. The dispatcher produces these; an
/// observer must never see an event it generated itself, so the actor is
/// always excluded from fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    pub kind: RoomEventKind,
    pub actor_id: ObjectId,
    pub actor_name: String,
    pub message: Option<String>,
    pub target: Option<ObjectId>,
}

impl RoomEvent {
    pub fn new(kind: RoomEventKind, actor_id: ObjectId, actor_name: impl Into<String>) -> Self {
        Self {
            kind,
            actor_id,
            actor_name: actor_name.into(),
            message: None,
            target: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Room,
    Tell,
    Emote,
    System,
}

/// A message-queue entry. Consumed by the server each tick and dispatched
/// to matching sessions: by `recipient` if set, otherwise to every session
/// whose player is in `room`, minus the sender for `Emote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: Option<ObjectId>,
    pub recipient: Option<ObjectId>,
    pub kind: MessageKind,
    pub text: String,
    pub room: Option<ObjectId>,
}
