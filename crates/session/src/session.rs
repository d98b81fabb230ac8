// SPDX-License-Identifier: MIT

//! Per-session state: identity once logged in, negotiated output
//! capabilities, and the line editor. The socket itself, the per-session
//! output mutex guarding concurrent writer/tick-message interleaving, and
//! the message-queue wiring all live in the server crate — this struct is
//! the state a reader/writer pair closes over, not the IO itself.

use jit_core::{ObjectId, SessionId};

use crate::line_editor::LineEditor;
use crate::renderer::{ColorSystem, RenderOptions};

pub struct SessionState {
    pub id: SessionId,
    pub player_id: Option<ObjectId>,
    pub player_name: Option<String>,
    pub wizard: bool,
    pub room: Option<ObjectId>,
    pub ansi: bool,
    pub unicode: bool,
    pub width: u16,
    pub height: u16,
    pub connected: bool,
    pub editor: LineEditor,
}

impl SessionState {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            player_id: None,
            player_name: None,
            wizard: false,
            room: None,
            ansi: true,
            unicode: true,
            width: 80,
            height: 24,
            connected: true,
            editor: LineEditor::new(true),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.player_id.is_some()
    }

    /// Applies a login's outcome: player identity, wizard flag, and the
    /// room the player is placed in. For a returning player the placement
    /// is a containment move, not a clone — the server resolves that, this
    /// just records the result.
    pub fn log_in(&mut self, player_id: ObjectId, player_name: impl Into<String>, wizard: bool, room: ObjectId) {
        self.player_id = Some(player_id);
        self.player_name = Some(player_name.into());
        self.wizard = wizard;
        self.room = Some(room);
    }

    pub fn set_ansi(&mut self, enabled: bool) {
        self.ansi = enabled;
        self.editor.set_ansi_enabled(enabled);
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            enable_ansi: self.ansi,
            enable_unicode: self.unicode,
            width: self.width,
            height: self.height,
            color_system: if self.ansi { ColorSystem::Ansi16 } else { ColorSystem::None },
        }
    }
}
