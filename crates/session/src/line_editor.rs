// SPDX-License-Identifier: MIT

//! Line editor: assembles one logical line per return key out of a raw
//! input byte stream. When ANSI has not been negotiated, the editor
//! degrades to echo-only assembly — only printable bytes, backspace, and
//! return are interpreted; arrow keys and control chords are simply
//! dropped rather than echoed, since without ANSI there is no way to
//! redraw a cursor position anyway.

use std::collections::VecDeque;

const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Outcome of feeding one byte into the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line is still being assembled; redraw from `visible()`/`cursor()`.
    Pending,
    /// Return completed a line. The editor's buffer is now empty.
    Line(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Esc,
    Bracket,
}

pub struct LineEditor {
    ansi_enabled: bool,
    buffer: Vec<char>,
    cursor: usize,
    history: VecDeque<String>,
    history_limit: usize,
    /// `Some(i)` while browsing history, `i` counted from the most recent
    /// entry (`0`). `None` means the buffer holds live, unsent input.
    browsing: Option<usize>,
    /// Buffer contents saved when history browsing began, restored on
    /// pressing down past the most recent entry.
    stashed: Vec<char>,
    escape: Escape,
}

impl LineEditor {
    pub fn new(ansi_enabled: bool) -> Self {
        Self {
            ansi_enabled,
            buffer: Vec::new(),
            cursor: 0,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            browsing: None,
            stashed: Vec::new(),
            escape: Escape::None,
        }
    }

    pub fn set_ansi_enabled(&mut self, enabled: bool) {
        self.ansi_enabled = enabled;
        self.escape = Escape::None;
    }

    pub fn visible(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Feeds one input byte. Returns `Line` exactly when `\r` or `\n`
    /// completes the current line.
    pub fn feed_byte(&mut self, byte: u8) -> LineOutcome {
        if self.ansi_enabled {
            if let Some(outcome) = self.feed_escape_aware(byte) {
                return outcome;
            }
        }
        match byte {
            b'\r' | b'\n' => return self.complete_line(),
            0x7F | 0x08 => self.backspace(),
            0x20..=0x7E => self.insert(byte as char),
            _ => {}
        }
        LineOutcome::Pending
    }

    fn feed_escape_aware(&mut self, byte: u8) -> Option<LineOutcome> {
        match self.escape {
            Escape::None => match byte {
                0x1B => {
                    self.escape = Escape::Esc;
                    Some(LineOutcome::Pending)
                }
                0x01 => {
                    self.home();
                    Some(LineOutcome::Pending)
                }
                0x05 => {
                    self.end();
                    Some(LineOutcome::Pending)
                }
                0x0B => {
                    self.delete_to_end();
                    Some(LineOutcome::Pending)
                }
                0x15 => {
                    self.delete_line();
                    Some(LineOutcome::Pending)
                }
                _ => None,
            },
            Escape::Esc => {
                if byte == b'[' {
                    self.escape = Escape::Bracket;
                } else {
                    self.escape = Escape::None;
                }
                Some(LineOutcome::Pending)
            }
            Escape::Bracket => {
                self.escape = Escape::None;
                match byte {
                    b'A' => self.history_up(),
                    b'B' => self.history_down(),
                    b'C' => self.right(),
                    b'D' => self.left(),
                    b'H' => self.home(),
                    b'F' => self.end(),
                    _ => {}
                }
                Some(LineOutcome::Pending)
            }
        }
    }

    fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        }
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    fn delete_to_end(&mut self) {
        self.buffer.truncate(self.cursor);
    }

    fn delete_line(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next = match self.browsing {
            None => {
                self.stashed = self.buffer.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(i) => i,
        };
        self.browsing = Some(next);
        self.buffer = self.history[next].chars().collect();
        self.cursor = self.buffer.len();
    }

    fn history_down(&mut self) {
        match self.browsing {
            None => {}
            Some(0) => {
                self.browsing = None;
                self.buffer = std::mem::take(&mut self.stashed);
                self.cursor = self.buffer.len();
            }
            Some(i) => {
                let next = i - 1;
                self.browsing = Some(next);
                self.buffer = self.history[next].chars().collect();
                self.cursor = self.buffer.len();
            }
        }
    }

    fn complete_line(&mut self) -> LineOutcome {
        let line: String = self.buffer.drain(..).collect();
        self.cursor = 0;
        self.browsing = None;
        self.stashed.clear();
        self.escape = Escape::None;
        self.push_history(line.clone());
        LineOutcome::Line(line)
    }

    fn push_history(&mut self, line: String) {
        if line.is_empty() {
            return;
        }
        if self.history.front().map(String::as_str) == Some(line.as_str()) {
            return;
        }
        self.history.push_front(line);
        while self.history.len() > self.history_limit {
            self.history.pop_back();
        }
    }
}
