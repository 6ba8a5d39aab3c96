//! Escape-prefix mode dispatch
//!
//! A session is normally in [`EditorMode::Edit`]. Escape arms
//! [`EditorMode::Prefix`]; the next key selects a [`ModeCommand`] and the
//! session drops back to edit mode whether or not the key was recognised.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::key::Key;

/// Editor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum EditorMode {
    /// Keys edit content or navigate
    Edit,
    /// Escape was pressed; the next key picks a command
    Prefix,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Edit => "EDIT",
            EditorMode::Prefix => "ESC",
        }
    }
}

/// Command selected by the key following Escape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum ModeCommand {
    Save,
    Copy,
    Cut,
    Paste,
    OpenFile,
    Exit,
}

impl ModeCommand {
    /// Map the key after Escape to a command
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Char('s') => Some(ModeCommand::Save),
            Key::Char('c') => Some(ModeCommand::Copy),
            Key::Char('x') => Some(ModeCommand::Cut),
            Key::Char('v') => Some(ModeCommand::Paste),
            Key::Char('o') => Some(ModeCommand::OpenFile),
            Key::Char('e') => Some(ModeCommand::Exit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeCommand::Save => "save",
            ModeCommand::Copy => "copy",
            ModeCommand::Cut => "cut",
            ModeCommand::Paste => "paste",
            ModeCommand::OpenFile => "open",
            ModeCommand::Exit => "exit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_strings() {
        assert_eq!(EditorMode::Edit.as_str(), "EDIT");
        assert_eq!(EditorMode::Prefix.as_str(), "ESC");
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(ModeCommand::from_key(Key::Char('s')), Some(ModeCommand::Save));
        assert_eq!(ModeCommand::from_key(Key::Char('c')), Some(ModeCommand::Copy));
        assert_eq!(ModeCommand::from_key(Key::Char('x')), Some(ModeCommand::Cut));
        assert_eq!(ModeCommand::from_key(Key::Char('v')), Some(ModeCommand::Paste));
        assert_eq!(ModeCommand::from_key(Key::Char('o')), Some(ModeCommand::OpenFile));
        assert_eq!(ModeCommand::from_key(Key::Char('e')), Some(ModeCommand::Exit));
        assert_eq!(ModeCommand::from_key(Key::Char('q')), None);
        assert_eq!(ModeCommand::from_key(Key::Escape), None);
    }
}
