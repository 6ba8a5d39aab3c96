//! # Input Script Parser
//!
//! Scripted key input for headless sessions and tests.
//!
//! ## Format
//!
//! Scripts are line-based, with each line representing one input action:
//! - Key names: `Enter`, `Escape`, `Backspace`, `Tab`, `Space`
//! - Arrow keys: `Up`, `Down`, `Left`, `Right`
//! - Single printable characters: `a`, `Z`, `;`
//! - Text strings: `"Hello World"` (expanded to individual key presses)
//! - Comments: `# This is a comment`
//! - Delays: `wait 100ms` (for timing control)
//! - Terminal size changes: `resize 80x24`
//!
//! ## Example
//!
//! ```text
//! # Type two lines and save them
//! "hello"
//! Enter
//! "world"
//! Escape
//! s
//! ```

use std::collections::VecDeque;

use editor_core::Key;
use thiserror::Error;

/// Input script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("Invalid key name: {0}")]
    InvalidKeyName(String),

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,

    #[error("Invalid delay format: {0}")]
    InvalidDelay(String),

    #[error("Invalid terminal size: {0}")]
    InvalidSize(String),
}

/// A single scripted input action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedInput {
    /// A single key press
    Key(Key),
    /// Wait for a duration (in milliseconds)
    Wait(u64),
    /// The terminal now has this many columns and rows
    Resize { cols: u16, rows: u16 },
}

/// Input script
///
/// Parses and provides scripted input events for deterministic testing.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<ScriptedInput>,
}

impl InputScript {
    /// Creates a new empty input script
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = Self::parse_line(line, line_num + 1)?;
            inputs.extend(parsed);
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }

        Ok(Self { inputs })
    }

    fn parse_line(line: &str, line_num: usize) -> Result<Vec<ScriptedInput>, InputScriptError> {
        let at_line = |e: InputScriptError| InputScriptError::ParseError {
            line: line_num,
            message: e.to_string(),
        };

        if let Some(duration) = line.strip_prefix("wait ") {
            let millis = Self::parse_duration(duration).map_err(at_line)?;
            return Ok(vec![ScriptedInput::Wait(millis)]);
        }

        if let Some(size) = line.strip_prefix("resize ") {
            let (cols, rows) = Self::parse_size(size).map_err(at_line)?;
            return Ok(vec![ScriptedInput::Resize { cols, rows }]);
        }

        // Quoted strings type each character
        if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
            let text = &line[1..line.len() - 1];
            return Ok(text.chars().map(|c| ScriptedInput::Key(Key::Char(c))).collect());
        }

        let key = Self::parse_key(line).map_err(at_line)?;
        Ok(vec![ScriptedInput::Key(key)])
    }

    /// Parses a key name
    fn parse_key(name: &str) -> Result<Key, InputScriptError> {
        match name.to_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "backspace" | "back" => Ok(Key::Backspace),
            "tab" => Ok(Key::Tab),
            "space" => Ok(Key::Char(' ')),

            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),

            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if editor_core::key::is_insertable(c) => Ok(Key::Char(c)),
                    _ => Err(InputScriptError::InvalidKeyName(name.to_string())),
                }
            }
        }
    }

    /// Parses a duration string (e.g., "100ms", "1s")
    fn parse_duration(s: &str) -> Result<u64, InputScriptError> {
        let s = s.trim().to_lowercase();

        if let Some(ms_str) = s.strip_suffix("ms") {
            ms_str
                .trim()
                .parse::<u64>()
                .map_err(|_| InputScriptError::InvalidDelay(s.to_string()))
        } else if let Some(s_str) = s.strip_suffix('s') {
            s_str
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|secs| secs.checked_mul(1000))
                .ok_or_else(|| InputScriptError::InvalidDelay(s.to_string()))
        } else {
            Err(InputScriptError::InvalidDelay(s.to_string()))
        }
    }

    /// Parses a `COLSxROWS` size
    fn parse_size(s: &str) -> Result<(u16, u16), InputScriptError> {
        let s = s.trim();
        let invalid = || InputScriptError::InvalidSize(s.to_string());
        let (cols, rows) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let cols = cols.trim().parse::<u16>().map_err(|_| invalid())?;
        let rows = rows.trim().parse::<u16>().map_err(|_| invalid())?;
        if cols == 0 || rows == 0 {
            return Err(invalid());
        }
        Ok((cols, rows))
    }

    /// Returns the next input event, if any
    pub fn next_input(&mut self) -> Option<ScriptedInput> {
        self.inputs.pop_front()
    }

    /// Returns true if the script has more inputs
    pub fn has_more(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Returns the number of remaining inputs
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}
