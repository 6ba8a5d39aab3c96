//! Vertical scrolling
//!
//! The viewport is a window of `capacity` document lines starting at
//! `scroll_offset`. Edits and vertical navigation nudge the offset by at
//! most one line; [`Viewport::follow`] and [`Viewport::clamp`] then keep the
//! cursor's line on screen and the offset inside the document.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// What the last event did, as far as scrolling is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// A newline cell was inserted
    InsertedNewline,
    /// Backspace removed a newline cell
    RemovedNewline,
    MoveUp,
    MoveDown,
    /// Anything that cannot change the line structure
    Other,
}

/// Scroll state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Viewport {
    scroll_offset: usize,
    capacity: usize,
}

impl Viewport {
    pub fn new(capacity: usize) -> Self {
        Self {
            scroll_offset: 0,
            capacity,
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }

    /// Largest offset that still fills the window from the bottom
    pub fn max_offset(&self, total_lines: usize) -> usize {
        total_lines.saturating_sub(self.capacity)
    }

    /// Adjust the offset for one event
    ///
    /// `cursor_row` is the cursor's screen row before the event and
    /// `total_lines` the document line count after it. Returns the new
    /// offset.
    pub fn on_event(
        &mut self,
        cursor_row: usize,
        event: ViewEvent,
        newlines_in_view: usize,
        total_lines: usize,
    ) -> usize {
        let last_row = self.capacity.saturating_sub(1);
        match event {
            ViewEvent::InsertedNewline => {
                if self.capacity > 0 && cursor_row >= last_row {
                    self.scroll_offset += 1;
                }
            }
            ViewEvent::RemovedNewline => {
                // Joining into a line above the window pulls that line back in
                if self.scroll_offset > 0 && cursor_row == 0 {
                    self.scroll_offset -= 1;
                } else if self.scroll_offset > 0 && newlines_in_view >= self.capacity {
                    // A full window at the end of a shrinking document
                    // reveals one earlier line
                    self.clamp(total_lines);
                }
            }
            ViewEvent::MoveUp => {
                if cursor_row == 0 && self.scroll_offset > 0 {
                    self.scroll_offset -= 1;
                }
            }
            ViewEvent::MoveDown => {
                if self.capacity > 0
                    && cursor_row >= last_row
                    && self.scroll_offset + self.capacity < total_lines
                {
                    self.scroll_offset += 1;
                }
            }
            ViewEvent::Other => {}
        }
        self.scroll_offset
    }

    /// Scroll the minimum amount that puts `line` inside the window
    pub fn follow(&mut self, line: usize) {
        if self.capacity == 0 {
            return;
        }
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + self.capacity {
            self.scroll_offset = line + 1 - self.capacity;
        }
    }

    /// Keep the offset within `[0, max(total_lines - capacity, 0)]`
    pub fn clamp(&mut self, total_lines: usize) {
        self.scroll_offset = self.scroll_offset.min(self.max_offset(total_lines));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrolled(offset: usize, capacity: usize) -> Viewport {
        let mut vp = Viewport::new(capacity);
        vp.follow(offset + capacity - 1);
        assert_eq!(vp.scroll_offset(), offset);
        vp
    }

    #[test]
    fn test_newline_on_last_row_scrolls() {
        let mut vp = Viewport::new(3);
        assert_eq!(vp.on_event(2, ViewEvent::InsertedNewline, 3, 5), 1);
    }

    #[test]
    fn test_newline_above_last_row_does_not_scroll() {
        let mut vp = Viewport::new(3);
        assert_eq!(vp.on_event(1, ViewEvent::InsertedNewline, 2, 4), 0);
    }

    #[test]
    fn test_removed_newline_on_first_row_scrolls_back() {
        let mut vp = scrolled(2, 3);
        assert_eq!(vp.on_event(0, ViewEvent::RemovedNewline, 1, 10), 1);
    }

    #[test]
    fn test_removed_newline_at_document_end_reveals_earlier_line() {
        // Lines 2..5 of a 5-line document were shown; one line is gone
        let mut vp = scrolled(2, 3);
        assert_eq!(vp.on_event(1, ViewEvent::RemovedNewline, 3, 4), 1);
    }

    #[test]
    fn test_removed_newline_with_content_below_keeps_offset() {
        let mut vp = scrolled(2, 3);
        assert_eq!(vp.on_event(1, ViewEvent::RemovedNewline, 3, 20), 2);
    }

    #[test]
    fn test_removed_newline_never_underflows() {
        let mut vp = Viewport::new(3);
        assert_eq!(vp.on_event(0, ViewEvent::RemovedNewline, 3, 2), 0);
    }

    #[test]
    fn test_up_at_top_row_scrolls() {
        let mut vp = scrolled(1, 3);
        assert_eq!(vp.on_event(0, ViewEvent::MoveUp, 3, 10), 0);
        assert_eq!(vp.on_event(0, ViewEvent::MoveUp, 3, 10), 0);
    }

    #[test]
    fn test_up_below_top_row_keeps_offset() {
        let mut vp = scrolled(1, 3);
        assert_eq!(vp.on_event(1, ViewEvent::MoveUp, 3, 10), 1);
    }

    #[test]
    fn test_down_at_last_row_with_more_content_scrolls() {
        let mut vp = Viewport::new(3);
        assert_eq!(vp.on_event(2, ViewEvent::MoveDown, 3, 5), 1);
        assert_eq!(vp.on_event(2, ViewEvent::MoveDown, 3, 5), 2);
    }

    #[test]
    fn test_down_at_last_row_of_document_stops() {
        let mut vp = Viewport::new(3);
        // Exactly three lines: nothing below the window
        assert_eq!(vp.on_event(2, ViewEvent::MoveDown, 2, 3), 0);
        let mut vp = scrolled(2, 3);
        assert_eq!(vp.on_event(2, ViewEvent::MoveDown, 2, 5), 2);
    }

    #[test]
    fn test_down_above_last_row_keeps_offset() {
        let mut vp = Viewport::new(3);
        assert_eq!(vp.on_event(1, ViewEvent::MoveDown, 3, 10), 0);
    }

    #[test]
    fn test_repeated_down_never_passes_document_end() {
        let mut vp = Viewport::new(4);
        for _ in 0..50 {
            vp.on_event(3, ViewEvent::MoveDown, 4, 9);
        }
        assert_eq!(vp.scroll_offset(), vp.max_offset(9));
        assert_eq!(vp.scroll_offset(), 5);
    }

    #[test]
    fn test_other_events_do_nothing() {
        let mut vp = scrolled(2, 3);
        assert_eq!(vp.on_event(2, ViewEvent::Other, 3, 10), 2);
    }

    #[test]
    fn test_follow_scrolls_minimally() {
        let mut vp = Viewport::new(3);
        vp.follow(1);
        assert_eq!(vp.scroll_offset(), 0);
        vp.follow(5);
        assert_eq!(vp.scroll_offset(), 3);
        vp.follow(4);
        assert_eq!(vp.scroll_offset(), 3);
        vp.follow(0);
        assert_eq!(vp.scroll_offset(), 0);
    }

    #[test]
    fn test_clamp_bounds_offset() {
        let mut vp = scrolled(8, 3);
        vp.clamp(5);
        assert_eq!(vp.scroll_offset(), 2);
        vp.clamp(2);
        assert_eq!(vp.scroll_offset(), 0);
    }

    #[test]
    fn test_zero_capacity() {
        let mut vp = Viewport::new(0);
        vp.follow(10);
        assert_eq!(vp.scroll_offset(), 0);
        assert_eq!(vp.on_event(0, ViewEvent::InsertedNewline, 0, 2), 0);
        assert_eq!(vp.on_event(0, ViewEvent::MoveDown, 0, 2), 0);
    }
}
