//! Selection marking, copy, cut and paste
//!
//! Selection is a two-press protocol: the first copy (or cut) command marks
//! the start cell, the second marks the end and transfers the inclusive
//! range into the clipboard. The ends may be marked in either order.

use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::alloc_guard::{reserve_or_abort, DEFAULT_ALLOC_RETRIES};
use crate::cell_store::{CellId, CellStore};

/// Clipboard size in bytes unless configured otherwise
pub const DEFAULT_CLIPBOARD_CAPACITY: usize = 1000;

/// Which command a selection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum ClipOp {
    Copy,
    Cut,
}

impl ClipOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipOp::Copy => "copy",
            ClipOp::Cut => "cut",
        }
    }
}

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Marking { op: ClipOp, start: CellId },
}

impl Selection {
    pub fn is_marking(&self) -> bool {
        matches!(self, Selection::Marking { .. })
    }

    pub fn reset(&mut self) {
        *self = Selection::Idle;
    }
}

/// Result of a mark command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// First end recorded
    Armed(ClipOp),
    /// Range copied into the clipboard
    Copied { copied: usize, truncated: bool },
    /// Range copied into the clipboard and removed from the store
    Cut {
        copied: usize,
        removed: usize,
        truncated: bool,
        /// Cell in front of the removed range
        predecessor: Option<CellId>,
    },
    /// Nothing to mark (empty store or a vanished start cell)
    Ignored,
}

/// Fixed-capacity copy buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clipboard {
    bytes: Vec<u8>,
    capacity: usize,
    alloc_retries: u32,
}

impl Clipboard {
    pub fn new(capacity: usize) -> Self {
        Self::with_alloc_retries(capacity, DEFAULT_ALLOC_RETRIES)
    }

    pub fn with_alloc_retries(capacity: usize, alloc_retries: u32) -> Self {
        Self {
            bytes: Vec::new(),
            capacity,
            alloc_retries,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alloc_retries(&self) -> u32 {
        self.alloc_retries
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Replace the contents, keeping at most `capacity` bytes. Returns true
    /// if `values` was cut short.
    pub fn replace(&mut self, values: &[u8]) -> bool {
        let keep = values.len().min(self.capacity);
        self.bytes.clear();
        reserve_or_abort(&mut self.bytes, keep, self.alloc_retries);
        self.bytes.extend_from_slice(&values[..keep]);
        keep < values.len()
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(DEFAULT_CLIPBOARD_CAPACITY)
    }
}

/// Record one end of a selection
///
/// `at` is the cell under the cursor (the tail when the cursor is past the
/// end). Marking with the other operation restarts the selection.
pub fn mark(
    selection: &mut Selection,
    clipboard: &mut Clipboard,
    store: &mut CellStore,
    op: ClipOp,
    at: Option<CellId>,
) -> MarkOutcome {
    let Some(at) = at.filter(|&id| store.contains(id)) else {
        selection.reset();
        return MarkOutcome::Ignored;
    };

    let start = match *selection {
        Selection::Marking { op: armed, start } if armed == op => start,
        _ => {
            *selection = Selection::Marking { op, start: at };
            return MarkOutcome::Armed(op);
        }
    };
    selection.reset();

    let (Some(a), Some(b)) = (store.sequence_index(start), store.sequence_index(at)) else {
        log::debug!("selection start vanished before the end was marked");
        return MarkOutcome::Ignored;
    };
    let (first, last, span) = if a <= b {
        (start, at, b - a + 1)
    } else {
        (at, start, a - b + 1)
    };

    let values = store.values_between(first, last, clipboard.capacity());
    clipboard.replace(&values);
    let truncated = span > clipboard.capacity();
    if truncated {
        log::warn!(
            "selection of {} bytes truncated to clipboard capacity {}",
            span,
            clipboard.capacity()
        );
    }
    let copied = clipboard.len();

    match op {
        ClipOp::Copy => MarkOutcome::Copied { copied, truncated },
        ClipOp::Cut => {
            let predecessor = store.prev(first);
            let removed = store.remove_range(first, last);
            MarkOutcome::Cut {
                copied,
                removed,
                truncated,
                predecessor,
            }
        }
    }
}

/// Insert the clipboard next to `under_cursor`
///
/// The text goes after the cell under the cursor, except when that cell is
/// a line's newline: then it goes in front of it so the pasted text stays
/// on the cursor's line. `None` (cursor past the end) appends. Returns the
/// last pasted cell, or `None` when nothing was inserted.
pub fn paste(
    clipboard: &Clipboard,
    store: &mut CellStore,
    under_cursor: Option<CellId>,
) -> Option<CellId> {
    if clipboard.is_empty() || store.is_empty() {
        return None;
    }

    let after = match under_cursor.filter(|&id| store.contains(id)) {
        Some(id) if store.value(id) == Some(b'\n') => match store.prev(id) {
            Some(prev) => Some(prev),
            // Newline is the head: paste becomes the new head
            None => return store.insert_after(None, clipboard.as_bytes()),
        },
        Some(id) => Some(id),
        None => store.tail(),
    };
    store.insert_after(after, clipboard.as_bytes())
}
