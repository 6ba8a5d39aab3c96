//! Terminal backends
//!
//! `CrosstermTerminal` drives a real tty in raw mode on the alternate
//! screen. `ScriptedTerminal` replays an [`InputScript`] and records the
//! frames it is asked to draw.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self as term, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use editor_core::Key;
use thiserror::Error;

use crate::input_script::{InputScript, ScriptedInput};
use crate::render::Frame;

/// How long `read_event` blocks before re-checking the resize flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Size assumed when the tty will not report one
const FALLBACK_SIZE: (u16, u16) = (80, 24);

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Something the host loop has to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    Key(Key),
    /// The window size changed; query `size()` again
    Resize,
    /// Input is exhausted
    Eof,
}

/// Set asynchronously when the window size changes
///
/// The signal handler and the event reader only ever raise it; the host
/// loop clears it with [`ResizeFlag::take`] before re-measuring.
#[derive(Debug, Clone, Default)]
pub struct ResizeFlag(Arc<AtomicBool>);

impl ResizeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The shared flag, for handing to a signal handler
    pub fn shared(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Terminal backend used by the editor loop
pub trait Terminal {
    /// Block until the next key, resize or end of input
    fn read_event(&mut self) -> Result<TermEvent, TerminalError>;

    /// Paint a full frame
    fn draw(&mut self, frame: &Frame) -> Result<(), TerminalError>;

    /// Current `(columns, rows)`
    fn size(&self) -> Result<(u16, u16), TerminalError>;

    fn resize_flag(&self) -> ResizeFlag;
}

/// Map a crossterm key event onto an editor key
pub fn map_key_event(event: KeyEvent) -> Key {
    if event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return match event.code {
            KeyCode::Char('[') => Key::Escape,
            _ => Key::Unknown,
        };
    }

    match event.code {
        KeyCode::Char(c) if editor_core::key::is_insertable(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        _ => Key::Unknown,
    }
}

/// Raw mode plus alternate screen, undone on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Interactive terminal on stdin/stdout
pub struct CrosstermTerminal {
    out: Stdout,
    resize: ResizeFlag,
    _guard: TerminalGuard,
}

impl CrosstermTerminal {
    pub fn new() -> Result<Self, TerminalError> {
        let guard = TerminalGuard::enter()?;
        let resize = ResizeFlag::new();

        #[cfg(unix)]
        signal_hook::flag::register(signal_hook::consts::SIGWINCH, resize.shared())?;

        log::debug!("terminal in raw mode");
        Ok(Self {
            out: io::stdout(),
            resize,
            _guard: guard,
        })
    }
}

impl Terminal for CrosstermTerminal {
    fn read_event(&mut self) -> Result<TermEvent, TerminalError> {
        loop {
            if self.resize.is_raised() {
                return Ok(TermEvent::Resize);
            }
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(TermEvent::Key(map_key_event(key)));
                }
                Event::Resize(cols, rows) => {
                    log::trace!("resize event {}x{}", cols, rows);
                    self.resize.raise();
                    return Ok(TermEvent::Resize);
                }
                _ => {}
            }
        }
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), TerminalError> {
        for (row, line) in frame.rows.iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(
                self.out,
                MoveTo(0, row),
                Print(line),
                Clear(ClearType::UntilNewLine)
            )?;
        }

        if let Some(status) = &frame.status {
            let row = u16::try_from(frame.rows.len()).unwrap_or(u16::MAX);
            queue!(
                self.out,
                MoveTo(0, row),
                SetAttribute(Attribute::Reverse),
                Print(status),
                Clear(ClearType::UntilNewLine),
                SetAttribute(Attribute::Reset)
            )?;
        }

        queue!(self.out, MoveTo(frame.cursor.0, frame.cursor.1))?;
        self.out.flush()?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16), TerminalError> {
        match term::size() {
            Ok((0, _)) | Ok((_, 0)) => Ok(FALLBACK_SIZE),
            Ok(size) => Ok(size),
            Err(err) => {
                log::warn!("terminal size unavailable: {}", err);
                Ok(FALLBACK_SIZE)
            }
        }
    }

    fn resize_flag(&self) -> ResizeFlag {
        self.resize.clone()
    }
}

/// Headless terminal fed by an input script
#[derive(Debug)]
pub struct ScriptedTerminal {
    script: InputScript,
    size: (u16, u16),
    resize: ResizeFlag,
    frames: Vec<Frame>,
    keep_frames: bool,
}

impl ScriptedTerminal {
    pub fn new(script: InputScript, cols: u16, rows: u16) -> Self {
        Self {
            script,
            size: (cols, rows),
            resize: ResizeFlag::new(),
            frames: Vec::new(),
            keep_frames: false,
        }
    }

    /// Record every drawn frame instead of only the latest
    pub fn keep_frames(mut self) -> Self {
        self.keep_frames = true;
        self
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn remaining(&self) -> usize {
        self.script.remaining()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_event(&mut self) -> Result<TermEvent, TerminalError> {
        loop {
            match self.script.next_input() {
                Some(ScriptedInput::Key(key)) => return Ok(TermEvent::Key(key)),
                Some(ScriptedInput::Wait(millis)) => thread::sleep(Duration::from_millis(millis)),
                Some(ScriptedInput::Resize { cols, rows }) => {
                    self.size = (cols, rows);
                    self.resize.raise();
                    return Ok(TermEvent::Resize);
                }
                None => return Ok(TermEvent::Eof),
            }
        }
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), TerminalError> {
        if !self.keep_frames {
            self.frames.clear();
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16), TerminalError> {
        Ok(self.size)
    }

    fn resize_flag(&self) -> ResizeFlag {
        self.resize.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Key {
        map_key_event(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_map_plain_keys() {
        assert_eq!(press(KeyCode::Char('a'), KeyModifiers::NONE), Key::Char('a'));
        assert_eq!(press(KeyCode::Char('A'), KeyModifiers::SHIFT), Key::Char('A'));
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), Key::Enter);
        assert_eq!(press(KeyCode::Tab, KeyModifiers::NONE), Key::Tab);
        assert_eq!(press(KeyCode::Backspace, KeyModifiers::NONE), Key::Backspace);
        assert_eq!(press(KeyCode::Esc, KeyModifiers::NONE), Key::Escape);
        assert_eq!(press(KeyCode::Up, KeyModifiers::NONE), Key::Up);
    }

    #[test]
    fn test_map_chords_and_unmapped_keys() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Key::Unknown);
        assert_eq!(press(KeyCode::Char('['), KeyModifiers::CONTROL), Key::Escape);
        assert_eq!(press(KeyCode::Char('é'), KeyModifiers::NONE), Key::Unknown);
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), Key::Unknown);
        assert_eq!(press(KeyCode::Delete, KeyModifiers::NONE), Key::Unknown);
    }

    #[test]
    fn test_resize_flag_take_clears() {
        let flag = ResizeFlag::new();
        assert!(!flag.take());
        flag.clone().raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_resize_flag_shared_with_signal_side() {
        let flag = ResizeFlag::new();
        flag.shared().store(true, Ordering::SeqCst);
        assert!(flag.take());
    }

    #[test]
    fn test_scripted_terminal_events() {
        let script = InputScript::from_text("a\nwait 1ms\nresize 40x10\nEnter").unwrap();
        let mut term = ScriptedTerminal::new(script, 80, 24);
        let flag = term.resize_flag();

        assert_eq!(term.read_event().unwrap(), TermEvent::Key(Key::Char('a')));
        assert_eq!(term.read_event().unwrap(), TermEvent::Resize);
        assert_eq!(term.size().unwrap(), (40, 10));
        assert!(flag.take());
        assert_eq!(term.read_event().unwrap(), TermEvent::Key(Key::Enter));
        assert_eq!(term.read_event().unwrap(), TermEvent::Eof);
        assert_eq!(term.read_event().unwrap(), TermEvent::Eof);
    }

    #[test]
    fn test_scripted_terminal_records_frames() {
        let mut term = ScriptedTerminal::new(InputScript::new(), 80, 24);
        let frame = Frame {
            rows: vec!["1: x".into()],
            status: None,
            cursor: (4, 0),
        };
        term.draw(&frame).unwrap();
        term.draw(&frame).unwrap();
        assert_eq!(term.frames().len(), 1);
        assert_eq!(term.last_frame(), Some(&frame));

        let mut term = ScriptedTerminal::new(InputScript::new(), 80, 24).keep_frames();
        term.draw(&frame).unwrap();
        term.draw(&frame).unwrap();
        assert_eq!(term.frames().len(), 2);
    }
}
