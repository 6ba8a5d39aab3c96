//! Character cell store and screen positions
//!
//! The document is a doubly linked chain of single-byte cells kept in an
//! arena. Links are arena indices, not pointers, so removing a run of cells
//! (cut) is an index relink plus slot recycling.
//!
//! Each cell carries a cached screen [`Position`] written by the projector.
//! The cache is tagged with the projection epoch that wrote it; any mutation
//! starts a new epoch, so a coordinate is only ever reported while it is
//! fresh. Addressing by coordinate is a linear scan over the chain.

use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::alloc_guard::{reserve_or_abort, DEFAULT_ALLOC_RETRIES};

/// Screen position (column includes the line-number gutter)
///
/// Ordering is row-major, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Stable handle to a cell
///
/// The generation makes handles to removed cells harmless: a recycled slot
/// never answers to an old id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Cell {
    value: u8,
    pos: Position,
    epoch: u64,
    prev: Option<CellId>,
    next: Option<CellId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

/// A cell removed by [`CellStore::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub value: u8,
    /// Cell that preceded the removed one, if any
    pub predecessor: Option<CellId>,
}

/// Ordered container of character cells
#[derive(Debug, Clone)]
pub struct CellStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<CellId>,
    tail: Option<CellId>,
    len: usize,
    newlines: usize,
    epoch: u64,
    alloc_retries: u32,
}

impl CellStore {
    pub fn new() -> Self {
        Self::with_alloc_retries(DEFAULT_ALLOC_RETRIES)
    }

    pub fn with_alloc_retries(alloc_retries: u32) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            newlines: 0,
            // Epoch 0 is never a projection epoch, so new cells start stale
            epoch: 1,
            alloc_retries,
        }
    }

    /// Build a store holding `buf` in order
    pub fn from_flat_buffer(buf: &[u8]) -> Self {
        let mut store = Self::new();
        store.extend_from_flat_buffer(buf);
        store
    }

    /// Append every byte of `buf` at the end of the document
    pub fn extend_from_flat_buffer(&mut self, buf: &[u8]) {
        reserve_or_abort(&mut self.slots, buf.len(), self.alloc_retries);
        let tail = self.tail;
        self.insert_after(tail, buf);
    }

    /// Document content in sequence order
    pub fn to_flat_buffer(&self) -> Vec<u8> {
        let mut out = Vec::new();
        reserve_or_abort(&mut out, self.len, self.alloc_retries);
        out.extend(self.iter().map(|(_, value)| value));
        out
    }

    pub fn count(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every cell and release the arena
    pub fn teardown(&mut self) {
        log::debug!("tearing down store with {} cells", self.len);
        self.slots = Vec::new();
        self.free = Vec::new();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.newlines = 0;
        self.epoch += 1;
    }

    pub fn set_alloc_retries(&mut self, retries: u32) {
        self.alloc_retries = retries;
    }

    pub fn head(&self) -> Option<CellId> {
        self.head
    }

    pub fn tail(&self) -> Option<CellId> {
        self.tail
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    pub fn value(&self, id: CellId) -> Option<u8> {
        self.cell(id).map(|c| c.value)
    }

    pub fn next(&self, id: CellId) -> Option<CellId> {
        self.cell(id).and_then(|c| c.next)
    }

    pub fn prev(&self, id: CellId) -> Option<CellId> {
        self.cell(id).and_then(|c| c.prev)
    }

    /// Screen position from the latest projection, `None` if stale
    pub fn position(&self, id: CellId) -> Option<Position> {
        self.cell(id)
            .filter(|c| c.epoch == self.epoch)
            .map(|c| c.pos)
    }

    /// Iterate `(id, value)` in sequence order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            cursor: self.head,
        }
    }

    /// Number of `'\n'` cells in the document
    pub fn newline_count(&self) -> usize {
        self.newlines
    }

    /// Number of display lines (a document always has at least one)
    pub fn line_count(&self) -> usize {
        self.newlines + 1
    }

    /// Zero-based offset of `id` in sequence order
    pub fn sequence_index(&self, id: CellId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.iter().position(|(cur, _)| cur == id)
    }

    /// Zero-based document line containing `id`
    pub fn line_of(&self, id: CellId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        let mut line = 0;
        for (cur, value) in self.iter() {
            if cur == id {
                return Some(line);
            }
            if value == b'\n' {
                line += 1;
            }
        }
        None
    }

    /// Cell that an insertion at `pos` goes in front of
    ///
    /// This is the first freshly projected cell at or after `pos` in screen
    /// order; `None` means the end of the document.
    pub fn insertion_point(&self, pos: Position) -> Option<CellId> {
        self.iter()
            .map(|(id, _)| id)
            .find(|&id| matches!(self.position(id), Some(p) if p >= pos))
    }

    /// Insert `value` in front of the cell at `at` (or at the end)
    pub fn insert(&mut self, at: Position, value: u8) -> CellId {
        let before = self.insertion_point(at);
        self.insert_before(before, value)
    }

    /// Remove the cell in front of position `at`
    ///
    /// Returns `None` when nothing precedes `at`: the document origin or an
    /// empty store.
    pub fn delete(&mut self, at: Position) -> Option<Removed> {
        let victim = match self.insertion_point(at) {
            Some(anchor) => self.prev(anchor)?,
            None => self.tail?,
        };
        let predecessor = self.prev(victim);
        let value = self.remove(victim)?;
        Some(Removed { value, predecessor })
    }

    /// Link a new cell in front of `before`; `None` appends
    pub fn insert_before(&mut self, before: Option<CellId>, value: u8) -> CellId {
        let prev = match before {
            Some(b) if self.contains(b) => self.prev(b),
            _ => self.tail,
        };
        let next = before.filter(|&b| self.contains(b));
        let id = self.alloc(value);
        self.link(id, prev, next);
        id
    }

    /// Link a chain built from `values` right after `after` (`None` = at
    /// the head). Returns the last inserted cell.
    pub fn insert_after(&mut self, after: Option<CellId>, values: &[u8]) -> Option<CellId> {
        let mut prev = after.filter(|&a| self.contains(a));
        let next = match prev {
            Some(p) => self.next(p),
            None => self.head,
        };
        let mut last = None;
        for &value in values {
            let id = self.alloc(value);
            self.link(id, prev, next);
            prev = Some(id);
            last = Some(id);
        }
        last
    }

    /// Unlink and free a single cell
    pub fn remove(&mut self, id: CellId) -> Option<u8> {
        let cell = self.cell(id)?.clone();
        match cell.prev {
            Some(p) => self.set_next(p, cell.next),
            None => self.head = cell.next,
        }
        match cell.next {
            Some(n) => self.set_prev(n, cell.prev),
            None => self.tail = cell.prev,
        }
        self.release(id);
        Some(cell.value)
    }

    /// Unlink every cell in `start..=end` (sequence order). Returns the
    /// number of cells removed; zero if either end is not a live cell or
    /// `end` does not follow `start`.
    pub fn remove_range(&mut self, start: CellId, end: CellId) -> usize {
        let (Some(first), Some(last)) = (self.cell(start), self.cell(end)) else {
            return 0;
        };
        let before = first.prev;
        let after = last.next;

        let mut doomed = Vec::new();
        let mut cur = Some(start);
        while let Some(id) = cur {
            doomed.push(id);
            if id == end {
                break;
            }
            cur = self.next(id);
        }
        if doomed.last() != Some(&end) {
            return 0;
        }

        match before {
            Some(p) => self.set_next(p, after),
            None => self.head = after,
        }
        match after {
            Some(n) => self.set_prev(n, before),
            None => self.tail = before,
        }
        for &id in &doomed {
            self.release(id);
        }
        doomed.len()
    }

    /// Values in `start..=end`, at most `cap` of them
    pub fn values_between(&self, start: CellId, end: CellId, cap: usize) -> Vec<u8> {
        let mut out = Vec::new();
        reserve_or_abort(&mut out, cap.min(self.len), self.alloc_retries);
        let mut cur = Some(start).filter(|&s| self.contains(s));
        while let Some(id) = cur {
            if out.len() < cap {
                if let Some(value) = self.value(id) {
                    out.push(value);
                }
            }
            if id == end {
                break;
            }
            cur = self.next(id);
        }
        out
    }

    // Projection hooks

    /// Start a projection pass; every cached coordinate becomes stale
    pub(crate) fn begin_projection(&mut self) {
        self.epoch += 1;
    }

    pub(crate) fn place(&mut self, id: CellId, pos: Position) {
        let epoch = self.epoch;
        if let Some(cell) = self.cell_mut(id) {
            cell.pos = pos;
            cell.epoch = epoch;
        }
    }

    // Arena internals

    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.cell.as_ref())
    }

    fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.cell.as_mut())
    }

    fn alloc(&mut self, value: u8) -> CellId {
        let cell = Cell {
            value,
            pos: Position::zero(),
            epoch: 0,
            prev: None,
            next: None,
        };
        self.len += 1;
        if value == b'\n' {
            self.newlines += 1;
        }
        self.epoch += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.cell = Some(cell);
            return CellId {
                index,
                generation: slot.generation,
            };
        }

        reserve_or_abort(&mut self.slots, 1, self.alloc_retries);
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cell: Some(cell),
        });
        CellId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: CellId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation {
            return;
        }
        if let Some(cell) = slot.cell.take() {
            self.len -= 1;
            if cell.value == b'\n' {
                self.newlines -= 1;
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.epoch += 1;
        }
    }

    fn link(&mut self, id: CellId, prev: Option<CellId>, next: Option<CellId>) {
        if let Some(cell) = self.cell_mut(id) {
            cell.prev = prev;
            cell.next = next;
        }
        match prev {
            Some(p) => self.set_next(p, Some(id)),
            None => self.head = Some(id),
        }
        match next {
            Some(n) => self.set_prev(n, Some(id)),
            None => self.tail = Some(id),
        }
    }

    fn set_next(&mut self, id: CellId, next: Option<CellId>) {
        if let Some(cell) = self.cell_mut(id) {
            cell.next = next;
        }
    }

    fn set_prev(&mut self, id: CellId, prev: Option<CellId>) {
        if let Some(cell) = self.cell_mut(id) {
            cell.prev = prev;
        }
    }
}

impl Default for CellStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequence-order iterator over `(id, value)`
pub struct Iter<'a> {
    store: &'a CellStore,
    cursor: Option<CellId>,
}

impl Iterator for Iter<'_> {
    type Item = (CellId, u8);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let cell = self.store.cell(id)?;
        self.cursor = cell.next;
        Some((id, cell.value))
    }
}
