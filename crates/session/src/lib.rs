// SPDX-License-Identifier: MIT

//! Session state, line editor, and renderer-adapter contract. This crate
//! owns per-connection state and the byte-level editing protocol; the
//! socket, the per-session output mutex, and the actual markup renderer
//! implementation are external collaborators.

pub mod line_editor;
pub mod renderer;
pub mod session;

pub use line_editor::{LineEditor, LineOutcome};
pub use renderer::{ColorSystem, Color, DefaultRenderer, Draw, RenderOptions, Renderer};
pub use session::SessionState;
