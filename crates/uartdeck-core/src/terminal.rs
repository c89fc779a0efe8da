//! ANSI escape sequences for an attached terminal emulator.

use core::fmt::{self, Write as _};

use crate::channel::Channel;
use crate::device::ChannelDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeSequence {
    /// `ESC[2J`
    ClearDisplay,
    /// `ESC[H`
    CursorHome,
    /// `ESC[{row};{col}H`, 1-based.
    CursorPosition { row: u8, col: u8 },
    /// `ESC[{code}m`
    Graphic(u8),
}

impl fmt::Display for EscapeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearDisplay => f.write_str("\x1b[2J"),
            Self::CursorHome => f.write_str("\x1b[H"),
            Self::CursorPosition { row, col } => write!(f, "\x1b[{row};{col}H"),
            Self::Graphic(code) => write!(f, "\x1b[{code}m"),
        }
    }
}

/// Foreground colours used by the demo screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Green = 32,
    Yellow = 33,
    Blue = 34,
}

impl From<Color> for u8 {
    fn from(color: Color) -> u8 {
        color as u8
    }
}

impl<D: ChannelDevice> Channel<D> {
    pub fn send_escape(&mut self, sequence: EscapeSequence) {
        // Channel's fmt::Write never fails.
        let _ = write!(self, "{sequence}");
    }

    /// Clears the display and homes the cursor.
    pub fn clear_screen(&mut self) {
        self.send_escape(EscapeSequence::ClearDisplay);
        self.send_escape(EscapeSequence::CursorHome);
    }

    /// Moves the cursor to column `col`, row `row`. The sequence carries the
    /// row first.
    pub fn move_cursor(&mut self, col: u8, row: u8) {
        self.send_escape(EscapeSequence::CursorPosition { row, col });
    }

    /// Selects graphic rendition `code`; any value is passed through.
    pub fn set_color(&mut self, code: impl Into<u8>) {
        self.send_escape(EscapeSequence::Graphic(code.into()));
    }
}
