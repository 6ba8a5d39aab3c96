//! Platform-independent key representation

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Platform-independent key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Key {
    // Printable ASCII
    Char(char),

    // Navigation
    Left,
    Right,
    Up,
    Down,

    // Content control keys
    Enter,
    Tab,
    Backspace,

    // Mode prefix
    Escape,

    /// Anything the backend could not map (function keys, chords, non-ASCII)
    Unknown,
}

impl Key {
    /// The byte this key inserts into the document, if it is a content key
    pub fn content_byte(&self) -> Option<u8> {
        match *self {
            Key::Char(ch) if is_insertable(ch) => Some(ch as u8),
            Key::Tab => Some(b'\t'),
            Key::Enter => Some(b'\n'),
            _ => None,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Key::Left | Key::Right | Key::Up | Key::Down)
    }
}

/// Printable single-byte characters accepted as document content
pub fn is_insertable(ch: char) -> bool {
    (' '..='~').contains(&ch)
}
