//! Coordinate projection
//!
//! Walks the chain from the head and writes a screen position into every
//! cell that falls inside the viewport window. Lines above the scroll
//! offset are skipped; the walk stops once `capacity` newlines have been
//! placed. Cells outside the window keep stale coordinates, which the
//! store refuses to report.

use crate::cell_store::{CellStore, Position};

/// Result of a projection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Projection {
    /// Newline cells placed inside the window
    pub newlines_in_view: usize,
    /// Document lines that are (at least partially) visible
    pub rows_in_view: usize,
}

impl Projection {
    /// True when every screen row is occupied by document text
    pub fn is_full(&self, capacity: usize) -> bool {
        capacity > 0 && self.rows_in_view >= capacity
    }
}

/// Columns a cell occupies on screen
///
/// Tabs advance by a flat `tab_width` regardless of the column they start
/// at; there are no tab stops.
pub fn cell_width(value: u8, tab_width: usize) -> usize {
    match value {
        b'\t' => tab_width,
        b'\n' => 0,
        _ => 1,
    }
}

/// Recompute screen positions for the cells inside the viewport window
pub fn project(
    store: &mut CellStore,
    scroll_offset: usize,
    tab_width: usize,
    left_margin: usize,
    capacity: usize,
) -> Projection {
    store.begin_projection();

    let rows_in_view = store
        .line_count()
        .saturating_sub(scroll_offset)
        .min(capacity);
    if capacity == 0 {
        return Projection::default();
    }

    let mut line = 0;
    let mut x = left_margin;
    let mut y = 0;
    let mut newlines_in_view = 0;
    let mut cur = store.head();

    while let Some(id) = cur {
        let Some(value) = store.value(id) else {
            break;
        };
        cur = store.next(id);

        if line >= scroll_offset {
            store.place(id, Position::new(y, x));
            if value == b'\n' {
                x = left_margin;
                y += 1;
                newlines_in_view += 1;
            } else {
                x += cell_width(value, tab_width);
            }
        }

        if value == b'\n' {
            line += 1;
            if newlines_in_view >= capacity {
                break;
            }
        }
    }

    Projection {
        newlines_in_view,
        rows_in_view,
    }
}
