//! Interactive editor host
//!
//! Feeds terminal events into an `EditorCore`, answers its save / open /
//! exit requests through an [`EditorIo`], and redraws after every event.

use std::path::{Path, PathBuf};

use editor_core::core::DEFAULT_CAPACITY;
use editor_core::{CoreIoRequest, CoreOutcome, EditorCore, Key};
use thiserror::Error;

use crate::config::{ConfigError, EditorConfig};
use crate::input_script::InputScriptError;
use crate::io::{EditorIo, IoError};
use crate::render::{EditorView, PromptLine};
use crate::terminal::{TermEvent, Terminal, TerminalError};

/// Longest file name the prompt accepts
pub const MAX_FILE_NAME: usize = 100;

const FILE_NAME_PROMPT: &str = "file name: ";
const OPEN_PROMPT: &str = "open file: ";
const EXIT_SAVE_PROMPT: &str = "save? (Y/N) ";
const OPEN_SAVE_PROMPT: &str = "modified, save? (Y/N) ";

/// Editor error
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] TerminalError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),
}

/// Editor result
pub type EditorResult<T> = Result<T, EditorError>;

/// Editor action result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Continue editing
    Continue,
    /// Document was written to this path
    Saved(PathBuf),
    /// Quit the editor
    Quit,
}

/// The terminal text editor
pub struct Editor {
    core: EditorCore,
    view: EditorView,
    path: Option<PathBuf>,
    input_closed: bool,
}

impl Editor {
    /// Create an editor with an empty, unnamed document
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            core: EditorCore::new(config.core_config(), DEFAULT_CAPACITY),
            view: EditorView::new(80, config.status_line),
            path: None,
            input_closed: false,
        }
    }

    pub fn core(&self) -> &EditorCore {
        &self.core
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load `path` as the starting document
    ///
    /// A missing file starts an empty document that will be saved there.
    pub fn open_initial(&mut self, io: &mut impl EditorIo, path: &Path) -> EditorResult<()> {
        match io.load(path) {
            Ok(bytes) => {
                self.core.load_content(&bytes);
            }
            Err(err) if err.is_not_found() => {
                log::info!("{} does not exist, starting empty", path.display());
                self.core.set_status_message("new file");
            }
            Err(err) => return Err(err.into()),
        }
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Run until exit or end of input
    ///
    /// Returns the final document; the cell store is torn down afterwards.
    pub fn run(
        &mut self,
        term: &mut impl Terminal,
        io: &mut impl EditorIo,
    ) -> EditorResult<Vec<u8>> {
        let resize = term.resize_flag();
        resize.take();
        self.apply_size(term.size()?);

        while !self.input_closed {
            if resize.take() {
                self.apply_size(term.size()?);
            }
            self.draw(term, None)?;

            match term.read_event()? {
                TermEvent::Key(key) => {
                    if self.process_key(key, term, io)? == EditorAction::Quit {
                        break;
                    }
                }
                TermEvent::Resize => {}
                TermEvent::Eof => self.input_closed = true,
            }
        }

        let content = self.core.content();
        self.core.teardown();
        log::info!("session ended with {} bytes", content.len());
        Ok(content)
    }

    /// Apply one key, running any prompt the core asks for
    pub fn process_key(
        &mut self,
        key: Key,
        term: &mut impl Terminal,
        io: &mut impl EditorIo,
    ) -> EditorResult<EditorAction> {
        match self.core.apply_key(key) {
            CoreOutcome::RequestIo(CoreIoRequest::Save) => self.save(term, io),
            CoreOutcome::RequestIo(CoreIoRequest::OpenFile) => self.open(term, io),
            CoreOutcome::RequestExit { dirty } => self.exit(dirty, term, io),
            CoreOutcome::Continue | CoreOutcome::Changed | CoreOutcome::StatusMessage(_) => {
                Ok(EditorAction::Continue)
            }
        }
    }

    /// Size the text area to the terminal
    fn apply_size(&mut self, (cols, rows): (u16, u16)) {
        let reserved = usize::from(self.view.status_line());
        let text_rows = usize::from(rows).saturating_sub(reserved).max(1);
        self.view.set_width(usize::from(cols).max(1));
        self.core.set_capacity(text_rows);
    }

    fn draw(
        &mut self,
        term: &mut impl Terminal,
        prompt: Option<PromptLine<'_>>,
    ) -> EditorResult<()> {
        let label = self.path.as_ref().map(|p| p.display().to_string());
        let frame = self.view.render(&self.core, label.as_deref(), prompt);
        term.draw(&frame)?;
        Ok(())
    }

    /// Wait for the next key, handling resizes and end of input
    fn next_prompt_key(&mut self, term: &mut impl Terminal) -> EditorResult<Option<Key>> {
        match term.read_event()? {
            TermEvent::Key(key) => Ok(Some(key)),
            TermEvent::Resize => {
                if term.resize_flag().take() {
                    self.apply_size(term.size()?);
                }
                Ok(None)
            }
            TermEvent::Eof => {
                self.input_closed = true;
                Ok(None)
            }
        }
    }

    /// Read a line on the status row; `None` when cancelled
    fn prompt_text(
        &mut self,
        term: &mut impl Terminal,
        label: &str,
    ) -> EditorResult<Option<String>> {
        let mut input = String::new();
        while !self.input_closed {
            self.draw(
                term,
                Some(PromptLine {
                    label,
                    input: &input,
                }),
            )?;
            let Some(key) = self.next_prompt_key(term)? else {
                continue;
            };
            match key {
                Key::Enter => return Ok(Some(input)),
                Key::Escape => return Ok(None),
                Key::Backspace => {
                    input.pop();
                }
                Key::Char(c) if input.len() < MAX_FILE_NAME => input.push(c),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Ask a yes/no question; `None` when cancelled
    fn prompt_yes_no(&mut self, term: &mut impl Terminal, label: &str) -> EditorResult<Option<bool>> {
        while !self.input_closed {
            self.draw(term, Some(PromptLine { label, input: "" }))?;
            match self.next_prompt_key(term)? {
                Some(Key::Char('y' | 'Y')) => return Ok(Some(true)),
                Some(Key::Char('n' | 'N')) => return Ok(Some(false)),
                Some(Key::Escape) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    fn save(&mut self, term: &mut impl Terminal, io: &mut impl EditorIo) -> EditorResult<EditorAction> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => match self.prompt_text(term, FILE_NAME_PROMPT)? {
                Some(name) if !name.trim().is_empty() => PathBuf::from(name.trim()),
                _ => {
                    self.core.set_status_message("save cancelled");
                    return Ok(EditorAction::Continue);
                }
            },
        };

        let content = self.core.content();
        match io.save(&path, &content) {
            Ok(()) => {
                self.core.mark_saved();
                self.core
                    .set_status_message(format!("saved {} bytes", content.len()));
                self.path = Some(path.clone());
                Ok(EditorAction::Saved(path))
            }
            Err(err) => {
                log::warn!("save failed: {}", err);
                self.core.set_status_message(err.to_string());
                Ok(EditorAction::Continue)
            }
        }
    }

    fn open(&mut self, term: &mut impl Terminal, io: &mut impl EditorIo) -> EditorResult<EditorAction> {
        if self.core.dirty() {
            match self.prompt_yes_no(term, OPEN_SAVE_PROMPT)? {
                Some(true) => {
                    if !matches!(self.save(term, io)?, EditorAction::Saved(_)) {
                        return Ok(EditorAction::Continue);
                    }
                }
                Some(false) => {}
                None => return Ok(EditorAction::Continue),
            }
        }

        let name = match self.prompt_text(term, OPEN_PROMPT)? {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                self.core.set_status_message("open cancelled");
                return Ok(EditorAction::Continue);
            }
        };

        let path = PathBuf::from(name.trim());
        match io.load(&path) {
            Ok(bytes) => {
                self.core.load_content(&bytes);
                self.core
                    .set_status_message(format!("opened {} bytes", bytes.len()));
                self.path = Some(path);
            }
            Err(err) => {
                log::warn!("open failed: {}", err);
                self.core.set_status_message(err.to_string());
            }
        }
        Ok(EditorAction::Continue)
    }

    fn exit(
        &mut self,
        dirty: bool,
        term: &mut impl Terminal,
        io: &mut impl EditorIo,
    ) -> EditorResult<EditorAction> {
        if !dirty {
            return Ok(EditorAction::Quit);
        }
        match self.prompt_yes_no(term, EXIT_SAVE_PROMPT)? {
            Some(true) => match self.save(term, io)? {
                EditorAction::Saved(_) => Ok(EditorAction::Quit),
                _ => Ok(EditorAction::Continue),
            },
            Some(false) => Ok(EditorAction::Quit),
            None => Ok(EditorAction::Continue),
        }
    }
}
