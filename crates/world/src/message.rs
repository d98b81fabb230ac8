// SPDX-License-Identifier: MIT

//! Message queue: FIFO fan-out of room/tell/emote notifications, consumed
//! by the server's tick loop and dispatched to matching sessions. Backed
//! by an unbounded MPSC channel: any number of producers (commands,
//! world-code hooks, the server itself), one consumer (the tick loop).

use jit_core::{Message, MessageKind, ObjectId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Clone)]
pub struct MessageSender(UnboundedSender<Message>);

impl MessageSender {
    pub fn send(&self, message: Message) {
        // The only failure mode is "no receiver left", i.e. the tick loop
        // has already shut down; dropping the message is correct there.
        let _ = self.0.send(message);
    }

    pub fn room(&self, sender: Option<ObjectId>, room: ObjectId, text: impl Into<String>) {
        self.send(Message {
            sender,
            recipient: None,
            kind: MessageKind::Room,
            text: text.into(),
            room: Some(room),
        });
    }

    pub fn tell(&self, sender: Option<ObjectId>, recipient: ObjectId, text: impl Into<String>) {
        self.send(Message {
            sender,
            recipient: Some(recipient),
            kind: MessageKind::Tell,
            text: text.into(),
            room: None,
        });
    }

    pub fn system(&self, recipient: ObjectId, text: impl Into<String>) {
        self.send(Message {
            sender: None,
            recipient: Some(recipient),
            kind: MessageKind::System,
            text: text.into(),
            room: None,
        });
    }
}

pub struct MessageReceiver(UnboundedReceiver<Message>);

impl MessageReceiver {
    /// Drains every message currently queued without awaiting — the tick
    /// loop calls this once per tick rather than awaiting indefinitely, so
    /// one slow tick doesn't stall message delivery.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut drained = Vec::new();
        while let Ok(message) = self.0.try_recv() {
            drained.push(message);
        }
        drained
    }
}

pub fn message_queue() -> (MessageSender, MessageReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MessageSender(tx), MessageReceiver(rx))
}

/// Picks the sessions (by player id) a message should reach, given the
/// session's current room. `Emote`-kind messages exclude the sender;
/// `Room` messages are a general room fan-out and do not exclude the
/// sender by default, since some room announcements (e.g. "the sword
/// vanishes") have no actor.
pub fn recipients_for<'a>(
    message: &'a Message,
    sessions: impl Iterator<Item = (&'a ObjectId, &'a ObjectId)>,
) -> Vec<&'a ObjectId> {
    if let Some(recipient) = &message.recipient {
        return sessions
            .filter(|(player, _room)| *player == recipient)
            .map(|(player, _)| player)
            .collect();
    }
    let Some(room) = &message.room else {
        return Vec::new();
    };
    sessions
        .filter(|(player, player_room)| {
            *player_room == room
                && !(message.kind == MessageKind::Emote && Some(*player) == message.sender.as_ref())
        })
        .map(|(player, _)| player)
        .collect()
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
