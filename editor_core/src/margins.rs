//! Navigable rectangle
//!
//! Margins are derived from the latest projection and recomputed every
//! event. The left margin doubles as the line-number gutter width.

use alloc::vec::Vec;

use crate::cell_store::CellStore;
use crate::projector::{cell_width, Projection};

/// Bounds the cursor may occupy, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl Margins {
    pub fn new(left: usize) -> Self {
        Self {
            left,
            right: left,
            top: 0,
            bottom: 0,
        }
    }
}

/// Gutter width for a document with `line_count` lines
///
/// Room for the widest line number, its `:` separator and one blank
/// column: 3 below 10 lines, 4 below 100, 5 below 1000, and so on.
pub fn left_margin_for(line_count: usize) -> usize {
    let mut digits = 1;
    let mut n = line_count.max(1);
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits + 2
}

/// Columns on `row` where the cursor may rest
///
/// Every cell start is a stop. The last stop is the row's right margin: the
/// column of its terminating newline, or one past the last cell on the
/// final line. An empty row has the single stop `left`.
pub fn row_stops(store: &CellStore, row: usize, left: usize, tab_width: usize) -> Vec<usize> {
    let mut stops = Vec::new();
    let mut end = None;

    for (id, value) in store.iter() {
        let Some(pos) = store.position(id) else {
            continue;
        };
        if pos.row < row {
            continue;
        }
        if pos.row > row {
            break;
        }
        stops.push(pos.col);
        if value == b'\n' {
            end = None;
            break;
        }
        end = Some(pos.col + cell_width(value, tab_width));
    }

    if let Some(end) = end {
        stops.push(end);
    }
    if stops.is_empty() {
        stops.push(left);
    }
    stops
}

/// Right margin of `row`
pub fn right_margin(store: &CellStore, row: usize, left: usize, tab_width: usize) -> usize {
    row_stops(store, row, left, tab_width)
        .last()
        .copied()
        .unwrap_or(left)
}

/// Recompute all four margins for the cursor's row
pub fn recompute(
    store: &CellStore,
    projection: &Projection,
    cursor_row: usize,
    capacity: usize,
    tab_width: usize,
) -> Margins {
    let left = left_margin_for(store.line_count());
    let bottom = projection
        .rows_in_view
        .saturating_sub(1)
        .min(capacity.saturating_sub(1));
    let row = cursor_row.min(bottom);
    Margins {
        left,
        right: right_margin(store, row, left, tab_width),
        top: 0,
        bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::project;

    fn projected(text: &[u8], scroll: usize, capacity: usize) -> (CellStore, Projection) {
        let mut store = CellStore::from_flat_buffer(text);
        let left = left_margin_for(store.line_count());
        let proj = project(&mut store, scroll, 4, left, capacity);
        (store, proj)
    }

    #[test]
    fn test_left_margin_thresholds() {
        assert_eq!(left_margin_for(0), 3);
        assert_eq!(left_margin_for(1), 3);
        assert_eq!(left_margin_for(9), 3);
        assert_eq!(left_margin_for(10), 4);
        assert_eq!(left_margin_for(99), 4);
        assert_eq!(left_margin_for(100), 5);
        assert_eq!(left_margin_for(999), 5);
        assert_eq!(left_margin_for(1000), 6);
        assert_eq!(left_margin_for(9999), 6);
        assert_eq!(left_margin_for(10000), 7);
    }

    #[test]
    fn test_left_margin_grows_with_document() {
        let mut text = Vec::new();
        let mut last = left_margin_for(CellStore::from_flat_buffer(&text).line_count());
        for lines in 2..=1001usize {
            text.push(b'\n');
            let store = CellStore::from_flat_buffer(&text);
            assert_eq!(store.line_count(), lines);
            let margin = left_margin_for(store.line_count());
            if lines == 10 || lines == 100 || lines == 1000 {
                assert_eq!(margin, last + 1, "margin should widen at {} lines", lines);
            } else {
                assert_eq!(margin, last, "margin should hold at {} lines", lines);
            }
            last = margin;
        }
    }

    #[test]
    fn test_right_margin_is_newline_column() {
        let (store, _) = projected(b"abc\nd", 0, 10);
        assert_eq!(right_margin(&store, 0, 3, 4), 6);
        assert_eq!(right_margin(&store, 1, 3, 4), 4);
    }

    #[test]
    fn test_right_margin_of_empty_row() {
        let (store, _) = projected(b"abc\n\n", 0, 10);
        assert_eq!(right_margin(&store, 1, 3, 4), 3);
        assert_eq!(right_margin(&store, 2, 3, 4), 3);
    }

    #[test]
    fn test_row_stops_with_tab() {
        let (store, _) = projected(b"a\tb", 0, 10);
        assert_eq!(row_stops(&store, 0, 3, 4), [3, 4, 8, 9]);
    }

    #[test]
    fn test_recompute_bottom_capped_by_capacity() {
        let (store, proj) = projected(b"a\nb\nc\nd\ne", 0, 3);
        let margins = recompute(&store, &proj, 0, 3, 4);
        assert_eq!(margins.top, 0);
        assert_eq!(margins.bottom, 2);
        assert_eq!(margins.left, 3);
        assert_eq!(margins.right, 4);
    }

    #[test]
    fn test_recompute_bottom_short_document() {
        let (store, proj) = projected(b"a\nb", 0, 10);
        let margins = recompute(&store, &proj, 5, 10, 4);
        assert_eq!(margins.bottom, 1);
        assert_eq!(margins.right, 4);
    }

    #[test]
    fn test_recompute_empty_document() {
        let (store, proj) = projected(b"", 0, 10);
        let margins = recompute(&store, &proj, 0, 10, 4);
        assert_eq!(margins, Margins::new(3));
    }
}
