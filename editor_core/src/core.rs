//! EditorCore session
//!
//! Owns the document and every piece of view state, and runs one key at a
//! time through the pipeline: mode dispatch, edit or navigation, viewport
//! adjustment, projection, margins. Nothing here touches a file or the
//! terminal; saving, opening and exiting are requested from the host.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::alloc_guard::DEFAULT_ALLOC_RETRIES;
use crate::cell_store::{CellId, CellStore, Position};
use crate::clipboard::{self, ClipOp, Clipboard, MarkOutcome, Selection, DEFAULT_CLIPBOARD_CAPACITY};
use crate::cursor::{self, EditOutcome};
use crate::key::Key;
use crate::margins::{self, Margins};
use crate::mode::{EditorMode, ModeCommand};
use crate::projector::{self, Projection};
use crate::snapshot::EditorSnapshot;
use crate::viewport::{ViewEvent, Viewport};

/// Columns a tab expands to unless configured otherwise
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Text rows used when the host has not reported a terminal size yet
pub const DEFAULT_CAPACITY: usize = 23;

/// Session tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct CoreConfig {
    pub tab_width: usize,
    pub clipboard_capacity: usize,
    pub alloc_retries: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            clipboard_capacity: DEFAULT_CLIPBOARD_CAPACITY,
            alloc_retries: DEFAULT_ALLOC_RETRIES,
        }
    }
}

/// Outcome from applying a key to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreOutcome {
    /// Nothing changed
    Continue,
    /// Document, cursor, scroll or mode changed
    Changed,
    /// Request to leave the editor; `dirty` tells the host to offer a save
    RequestExit { dirty: bool },
    /// Display a status message
    StatusMessage(String),
    /// Request IO operation from host
    RequestIo(CoreIoRequest),
}

/// IO request from editor core to host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreIoRequest {
    /// Write the document to the current file (the host may prompt for one)
    Save,
    /// Replace the document with another file
    OpenFile,
}

/// Editor session state machine
pub struct EditorCore {
    config: CoreConfig,
    mode: EditorMode,
    store: CellStore,
    viewport: Viewport,
    projection: Projection,
    margins: Margins,
    cursor: Position,
    selection: Selection,
    clipboard: Clipboard,
    dirty: bool,
    status_message: String,
}

impl EditorCore {
    /// Create an empty session with `capacity` text rows
    pub fn new(config: CoreConfig, capacity: usize) -> Self {
        let mut core = Self {
            config,
            mode: EditorMode::Edit,
            store: CellStore::with_alloc_retries(config.alloc_retries),
            viewport: Viewport::new(capacity),
            projection: Projection::default(),
            margins: Margins::new(margins::left_margin_for(1)),
            cursor: Position::zero(),
            selection: Selection::Idle,
            clipboard: Clipboard::with_alloc_retries(
                config.clipboard_capacity,
                config.alloc_retries,
            ),
            dirty: false,
            status_message: String::new(),
        };
        core.settle(None);
        core
    }

    /// Apply a key event and return the outcome
    pub fn apply_key(&mut self, key: Key) -> CoreOutcome {
        self.status_message.clear();

        let outcome = match self.mode {
            EditorMode::Prefix => {
                self.mode = EditorMode::Edit;
                match ModeCommand::from_key(key) {
                    Some(cmd) => self.run_command(cmd),
                    None => {
                        log::debug!("swallowed {:?} after escape", key);
                        CoreOutcome::Changed
                    }
                }
            }
            EditorMode::Edit => match key {
                Key::Escape => {
                    self.mode = EditorMode::Prefix;
                    CoreOutcome::Changed
                }
                k if k.is_navigation() => self.navigate(k),
                k => self.edit(k),
            },
        };

        if let CoreOutcome::StatusMessage(msg) = &outcome {
            self.status_message = msg.clone();
        }
        outcome
    }

    /// Get a complete snapshot of editor state (for parity testing)
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            mode: self.mode,
            cursor: self.cursor,
            content: self.store.to_flat_buffer(),
            scroll_offset: self.viewport.scroll_offset(),
            dirty: self.dirty,
            clipboard: self.clipboard.as_bytes().to_vec(),
            marking: self.selection.is_marking(),
        }
    }

    // Public accessors for rendering/testing
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Zero-based document line under the cursor
    pub fn cursor_line(&self) -> usize {
        self.viewport.scroll_offset() + self.cursor.row
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn scroll_offset(&self) -> usize {
        self.viewport.scroll_offset()
    }

    pub fn capacity(&self) -> usize {
        self.viewport.capacity()
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn clipboard(&self) -> &[u8] {
        self.clipboard.as_bytes()
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Document bytes in order
    pub fn content(&self) -> Vec<u8> {
        self.store.to_flat_buffer()
    }

    /// Cells inside the window with their screen positions
    pub fn visible_cells(&self) -> impl Iterator<Item = (Position, u8)> + '_ {
        self.store
            .iter()
            .filter_map(move |(id, value)| self.store.position(id).map(|pos| (pos, value)))
    }

    /// `(screen row, 1-based line number)` for every visible line
    pub fn visible_line_numbers(&self) -> impl Iterator<Item = (usize, usize)> {
        let first = self.viewport.scroll_offset() + 1;
        (0..self.projection.rows_in_view).map(move |row| (row, first + row))
    }

    /// Replace the document; the cursor lands at its end
    pub fn load_content(&mut self, bytes: &[u8]) {
        self.store.teardown();
        self.store.set_alloc_retries(self.config.alloc_retries);
        self.store.extend_from_flat_buffer(bytes);
        self.viewport.reset();
        self.selection.reset();
        self.mode = EditorMode::Edit;
        self.dirty = false;
        self.cursor = Position::zero();
        let tail = self.store.tail();
        self.settle(tail);
        log::debug!(
            "loaded {} bytes in {} lines",
            self.store.count(),
            self.store.line_count()
        );
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Resize the window to `rows` text rows, keeping the cursor's line
    pub fn set_capacity(&mut self, rows: usize) {
        if rows == self.viewport.capacity() {
            return;
        }
        let line = self.cursor_line();
        self.viewport.set_capacity(rows);
        self.viewport.clamp(self.store.line_count());
        self.viewport.follow(line);
        self.cursor.row = line.saturating_sub(self.viewport.scroll_offset());
        self.refresh();
        self.place_cursor(self.cursor);
        log::debug!(
            "capacity now {} rows, scroll offset {}",
            rows,
            self.viewport.scroll_offset()
        );
    }

    /// Release every cell; the session is left with an empty document
    pub fn teardown(&mut self) {
        self.store.teardown();
        self.selection.reset();
        self.viewport.reset();
        self.cursor = Position::zero();
        self.settle(None);
    }

    // Pipeline

    fn run_command(&mut self, cmd: ModeCommand) -> CoreOutcome {
        log::debug!("command {}", cmd.as_str());
        match cmd {
            ModeCommand::Save => CoreOutcome::RequestIo(CoreIoRequest::Save),
            ModeCommand::OpenFile => CoreOutcome::RequestIo(CoreIoRequest::OpenFile),
            ModeCommand::Exit => CoreOutcome::RequestExit { dirty: self.dirty },
            ModeCommand::Copy => self.mark(ClipOp::Copy),
            ModeCommand::Cut => self.mark(ClipOp::Cut),
            ModeCommand::Paste => self.paste(),
        }
    }

    fn edit(&mut self, key: Key) -> CoreOutcome {
        let row = self.cursor.row;
        let newlines_in_view = self.projection.newlines_in_view;

        let outcome = cursor::edit(&mut self.store, self.cursor, key);
        let event = match outcome {
            EditOutcome::Unchanged => return CoreOutcome::Continue,
            EditOutcome::Inserted { value: b'\n', .. } => ViewEvent::InsertedNewline,
            EditOutcome::Deleted { value: b'\n', .. } => ViewEvent::RemovedNewline,
            _ => ViewEvent::Other,
        };

        self.dirty = true;
        self.viewport
            .on_event(row, event, newlines_in_view, self.store.line_count());
        self.settle(outcome.landing_cell());
        CoreOutcome::Changed
    }

    fn navigate(&mut self, key: Key) -> CoreOutcome {
        let event = match key {
            Key::Up => ViewEvent::MoveUp,
            Key::Down => ViewEvent::MoveDown,
            _ => ViewEvent::Other,
        };

        let before = self.viewport.scroll_offset();
        let after = self.viewport.on_event(
            self.cursor.row,
            event,
            self.projection.newlines_in_view,
            self.store.line_count(),
        );
        if after != before {
            self.refresh();
        }

        let target = cursor::navigate(
            &self.store,
            self.cursor,
            key,
            &self.margins,
            self.config.tab_width,
        );
        if target == self.cursor && after == before {
            return CoreOutcome::Continue;
        }
        self.place_cursor(target);
        CoreOutcome::Changed
    }

    fn mark(&mut self, op: ClipOp) -> CoreOutcome {
        let at = self.cell_under_cursor().or(self.store.tail());
        let outcome = clipboard::mark(
            &mut self.selection,
            &mut self.clipboard,
            &mut self.store,
            op,
            at,
        );

        match outcome {
            MarkOutcome::Armed(op) => {
                CoreOutcome::StatusMessage(format!("{}: start marked", op.as_str()))
            }
            MarkOutcome::Copied { copied, truncated } => {
                CoreOutcome::StatusMessage(copied_message("copied", copied, truncated))
            }
            MarkOutcome::Cut {
                copied,
                removed,
                truncated,
                predecessor,
            } => {
                if removed > 0 {
                    self.dirty = true;
                    self.settle(predecessor);
                }
                CoreOutcome::StatusMessage(copied_message("cut", copied, truncated))
            }
            MarkOutcome::Ignored => CoreOutcome::Continue,
        }
    }

    fn paste(&mut self) -> CoreOutcome {
        let under = self.cell_under_cursor();
        match clipboard::paste(&self.clipboard, &mut self.store, under) {
            Some(last) => {
                self.dirty = true;
                self.settle(Some(last));
                CoreOutcome::Changed
            }
            None => CoreOutcome::Continue,
        }
    }

    /// Cell at or after the cursor in the current projection
    fn cell_under_cursor(&self) -> Option<CellId> {
        self.store.insertion_point(self.cursor)
    }

    /// Scroll so the position after `after` is visible, reproject and put
    /// the cursor there. `None` is the document origin.
    fn settle(&mut self, after: Option<CellId>) {
        let line = match after {
            Some(id) => {
                let line = self.store.line_of(id).unwrap_or(0);
                if self.store.value(id) == Some(b'\n') {
                    line + 1
                } else {
                    line
                }
            }
            None => 0,
        };

        self.viewport.clamp(self.store.line_count());
        self.viewport.follow(line);
        self.refresh();

        let landing = cursor::landing(
            &self.store,
            after,
            self.viewport.scroll_offset(),
            self.margins.left,
            self.config.tab_width,
        );
        self.place_cursor(landing.unwrap_or(self.cursor));
    }

    /// Reproject the window and recompute the margins
    fn refresh(&mut self) {
        let line_count = self.store.line_count();
        self.viewport.clamp(line_count);
        self.projection = projector::project(
            &mut self.store,
            self.viewport.scroll_offset(),
            self.config.tab_width,
            margins::left_margin_for(line_count),
            self.viewport.capacity(),
        );
        self.margins = margins::recompute(
            &self.store,
            &self.projection,
            self.cursor.row,
            self.viewport.capacity(),
            self.config.tab_width,
        );
    }

    fn place_cursor(&mut self, pos: Position) {
        let tab_width = self.config.tab_width;
        self.cursor = cursor::clamp(&self.store, pos, &self.margins, tab_width);
        self.margins.right =
            margins::right_margin(&self.store, self.cursor.row, self.margins.left, tab_width);
    }
}

fn copied_message(verb: &str, copied: usize, truncated: bool) -> String {
    if truncated {
        format!("{} {} chars (clipboard full)", verb, copied)
    } else {
        format!("{} {} chars", verb, copied)
    }
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::new(CoreConfig::default(), DEFAULT_CAPACITY)
    }
}
