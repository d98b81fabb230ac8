// SPDX-License-Identifier: MIT

//! Renderer-adapter contract. The actual markup renderer — colour themes,
//! box-drawing, wrapping — is an external collaborator; this crate only
//! defines the narrow interface it must satisfy and a minimal default
//! implementation exercising that contract for tests and for a
//! bare-bones console session.

/// A terminal colour, abstract over whatever the renderer's colour system
/// supports. `Named` always degrades safely; `Ansi256`/`TrueColor` are
/// dropped to the nearest effect a `ColorSystem::Ansi16` renderer can still
/// express (bold/plain) rather than emitting an unsupported escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Ansi256(u8),
    TrueColor(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl NamedColor {
    fn ansi_code(self) -> u8 {
        match self {
            NamedColor::Black => 30,
            NamedColor::Red => 31,
            NamedColor::Green => 32,
            NamedColor::Yellow => 33,
            NamedColor::Blue => 34,
            NamedColor::Magenta => 35,
            NamedColor::Cyan => 36,
            NamedColor::White => 37,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSystem {
    None,
    Ansi16,
    Ansi256,
    TrueColor,
}

/// A render target's negotiated capabilities.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub enable_ansi: bool,
    pub enable_unicode: bool,
    pub width: u16,
    pub height: u16,
    pub color_system: ColorSystem,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_ansi: true,
            enable_unicode: true,
            width: 80,
            height: 24,
            color_system: ColorSystem::Ansi16,
        }
    }
}

/// A tree of drawable content. Minimal on purpose — the shipped renderer is
/// an external collaborator; this is just enough structure for the driver's
/// own status/error lines and for exercising the contract in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Draw {
    Text(String),
    Colored(String, Color),
    Seq(Vec<Draw>),
    Line(Vec<Draw>),
}

const RESET: &str = "\x1b[0m";

pub trait Renderer: Send + Sync {
    /// `render(draw, opts) -> string`. Output must be CRLF-terminated
    /// line-by-line with no bare LF/CR remaining, must contain no escape
    /// bytes at all when `opts.enable_ansi` is false, and any chromatic
    /// segment emitted while ANSI is enabled must end with the reset
    /// sequence `ESC[0m`.
    fn render(&self, draw: &Draw, opts: &RenderOptions) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl Renderer for DefaultRenderer {
    fn render(&self, draw: &Draw, opts: &RenderOptions) -> String {
        let mut out = String::new();
        render_into(draw, opts, &mut out);
        normalize_line_endings(&out)
    }
}

fn render_into(draw: &Draw, opts: &RenderOptions, out: &mut String) {
    match draw {
        Draw::Text(text) => out.push_str(text),
        Draw::Colored(text, color) => {
            if opts.enable_ansi {
                out.push_str(&ansi_prefix(*color, opts.color_system));
                out.push_str(text);
                out.push_str(RESET);
            } else {
                out.push_str(text);
            }
        }
        Draw::Seq(parts) => {
            for part in parts {
                render_into(part, opts, out);
            }
        }
        Draw::Line(parts) => {
            for part in parts {
                render_into(part, opts, out);
            }
            out.push('\n');
        }
    }
}

fn ansi_prefix(color: Color, system: ColorSystem) -> String {
    if matches!(system, ColorSystem::None) {
        return String::new();
    }
    match color {
        Color::Named(name) => format!("\x1b[{}m", name.ansi_code()),
        Color::Ansi256(code) if !matches!(system, ColorSystem::Ansi16) => format!("\x1b[38;5;{code}m"),
        Color::TrueColor(r, g, b) if matches!(system, ColorSystem::TrueColor) => format!("\x1b[38;2;{r};{g};{b}m"),
        // Degrade anything the negotiated color system can't express to plain white.
        _ => format!("\x1b[{}m", NamedColor::White.ansi_code()),
    }
}

/// Normalises every line terminator to CRLF: a bare `\n` becomes `\r\n`, a
/// bare `\r` becomes `\r\n`, and an existing `\r\n` is left alone.
fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            other => out.push(other),
        }
    }
    out
}
