//! Cursor movement and content keys
//!
//! Content keys mutate the store at the cursor. Navigation keys move the
//! cursor inside the margins, always landing on a cell boundary, so a tab
//! is crossed in one step.

use crate::cell_store::{CellId, CellStore, Position};
use crate::key::Key;
use crate::margins::{self, Margins};
use crate::projector::cell_width;

/// Result of applying a content key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// A new cell was linked in front of the cursor
    Inserted { cell: CellId, value: u8 },
    /// Backspace removed the cell before the cursor
    Deleted {
        value: u8,
        predecessor: Option<CellId>,
    },
    /// Nothing changed (backspace at the origin, non-content key)
    Unchanged,
}

impl EditOutcome {
    /// Cell the cursor should land after; `None` means the document origin
    pub fn landing_cell(&self) -> Option<CellId> {
        match *self {
            EditOutcome::Inserted { cell, .. } => Some(cell),
            EditOutcome::Deleted { predecessor, .. } => predecessor,
            EditOutcome::Unchanged => None,
        }
    }
}

/// Apply a content key at `cursor`
///
/// The store must hold a fresh projection so the cursor resolves to a cell.
pub fn edit(store: &mut CellStore, cursor: Position, key: Key) -> EditOutcome {
    if key == Key::Backspace {
        return match store.delete(cursor) {
            Some(removed) => EditOutcome::Deleted {
                value: removed.value,
                predecessor: removed.predecessor,
            },
            None => EditOutcome::Unchanged,
        };
    }

    match key.content_byte() {
        Some(value) => EditOutcome::Inserted {
            cell: store.insert(cursor, value),
            value,
        },
        None => EditOutcome::Unchanged,
    }
}

/// Screen position just after `cell`
///
/// `None` is the document origin. Returns `None` when the landing line is
/// outside the window or the projection is stale.
pub fn landing(
    store: &CellStore,
    cell: Option<CellId>,
    scroll_offset: usize,
    left: usize,
    tab_width: usize,
) -> Option<Position> {
    let Some(id) = cell else {
        return (scroll_offset == 0).then_some(Position::new(0, left));
    };

    let value = store.value(id)?;
    if value == b'\n' {
        // The newline itself may sit just above the window
        let line = store.line_of(id)? + 1;
        let row = line.checked_sub(scroll_offset)?;
        return Some(Position::new(row, left));
    }

    let pos = store.position(id)?;
    Some(Position::new(pos.row, pos.col + cell_width(value, tab_width)))
}

/// Largest stop at or before `col`, else the first stop
pub fn snap(col: usize, stops: &[usize]) -> usize {
    stops
        .iter()
        .rev()
        .copied()
        .find(|&s| s <= col)
        .or_else(|| stops.first().copied())
        .unwrap_or(col)
}

/// Move the cursor for a navigation key
///
/// Scrolling is the viewport's business; here the row is simply held at
/// the top or bottom margin.
pub fn navigate(
    store: &CellStore,
    cursor: Position,
    key: Key,
    margins: &Margins,
    tab_width: usize,
) -> Position {
    let stops_on = |row| margins::row_stops(store, row, margins.left, tab_width);

    match key {
        Key::Left => {
            let stops = stops_on(cursor.row);
            let col = stops
                .iter()
                .rev()
                .copied()
                .find(|&s| s < cursor.col)
                .unwrap_or_else(|| snap(cursor.col, &stops));
            Position::new(cursor.row, col)
        }
        Key::Right => {
            let stops = stops_on(cursor.row);
            let col = stops
                .iter()
                .copied()
                .find(|&s| s > cursor.col)
                .unwrap_or_else(|| snap(cursor.col, &stops));
            Position::new(cursor.row, col)
        }
        Key::Up | Key::Down => {
            let row = if key == Key::Up {
                if cursor.row > margins.top {
                    cursor.row - 1
                } else {
                    margins.top
                }
            } else if cursor.row < margins.bottom {
                cursor.row + 1
            } else {
                margins.bottom
            };
            Position::new(row, snap(cursor.col, &stops_on(row)))
        }
        _ => cursor,
    }
}

/// Pull a cursor back inside the margins
pub fn clamp(store: &CellStore, cursor: Position, margins: &Margins, tab_width: usize) -> Position {
    let row = cursor.row.clamp(margins.top, margins.bottom);
    let stops = margins::row_stops(store, row, margins.left, tab_width);
    Position::new(row, snap(cursor.col, &stops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margins::{left_margin_for, recompute};
    use crate::projector::project;

    const TAB: usize = 4;

    fn setup(text: &[u8]) -> (CellStore, Margins) {
        let mut store = CellStore::from_flat_buffer(text);
        let left = left_margin_for(store.line_count());
        let proj = project(&mut store, 0, TAB, left, 10);
        let margins = recompute(&store, &proj, 0, 10, TAB);
        (store, margins)
    }

    fn reproject(store: &mut CellStore) -> Margins {
        let left = left_margin_for(store.line_count());
        let proj = project(store, 0, TAB, left, 10);
        recompute(store, &proj, 0, 10, TAB)
    }

    #[test]
    fn test_typing_advances_cursor() {
        let (mut store, mut margins) = setup(b"");
        let mut cursor = Position::new(0, margins.left);
        for key in [Key::Char('h'), Key::Char('i')] {
            let out = edit(&mut store, cursor, key);
            margins = reproject(&mut store);
            cursor = landing(&store, out.landing_cell(), 0, margins.left, TAB).unwrap();
        }
        assert_eq!(store.to_flat_buffer(), b"hi");
        assert_eq!(cursor, Position::new(0, 5));
    }

    #[test]
    fn test_enter_before_first_char_rebinds_head() {
        let (mut store, margins) = setup(b"abc");
        let out = edit(&mut store, Position::new(0, margins.left), Key::Enter);
        let EditOutcome::Inserted { cell, value } = out else {
            panic!("expected insert, got {:?}", out);
        };
        assert_eq!(value, b'\n');
        assert_eq!(store.head(), Some(cell));
        assert_eq!(store.to_flat_buffer(), b"\nabc");

        let margins = reproject(&mut store);
        let cursor = landing(&store, Some(cell), 0, margins.left, TAB).unwrap();
        assert_eq!(cursor, Position::new(1, margins.left));
    }

    #[test]
    fn test_backspace_at_origin_is_unchanged() {
        let (mut store, margins) = setup(b"abc");
        let out = edit(&mut store, Position::new(0, margins.left), Key::Backspace);
        assert_eq!(out, EditOutcome::Unchanged);
        assert_eq!(store.to_flat_buffer(), b"abc");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let (mut store, margins) = setup(b"ab\ncd");
        let out = edit(&mut store, Position::new(1, margins.left), Key::Backspace);
        assert!(matches!(out, EditOutcome::Deleted { value: b'\n', .. }));
        assert_eq!(store.to_flat_buffer(), b"abcd");

        let margins = reproject(&mut store);
        let cursor = landing(&store, out.landing_cell(), 0, margins.left, TAB).unwrap();
        assert_eq!(cursor, Position::new(0, 5));
    }

    #[test]
    fn test_backspace_first_cell_lands_on_origin() {
        let (mut store, margins) = setup(b"abc");
        let out = edit(&mut store, Position::new(0, margins.left + 1), Key::Backspace);
        assert_eq!(
            out,
            EditOutcome::Deleted {
                value: b'a',
                predecessor: None
            }
        );
        let margins = reproject(&mut store);
        assert_eq!(
            landing(&store, out.landing_cell(), 0, margins.left, TAB),
            Some(Position::new(0, 3))
        );
    }

    #[test]
    fn test_non_content_keys_do_not_edit() {
        let (mut store, margins) = setup(b"abc");
        let cursor = Position::new(0, margins.left);
        assert_eq!(edit(&mut store, cursor, Key::Unknown), EditOutcome::Unchanged);
        assert_eq!(edit(&mut store, cursor, Key::Left), EditOutcome::Unchanged);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_left_right_stay_inside_margins() {
        let (store, margins) = setup(b"ab");
        let mut cursor = Position::new(0, margins.left);
        cursor = navigate(&store, cursor, Key::Left, &margins, TAB);
        assert_eq!(cursor.col, 3);
        for _ in 0..5 {
            cursor = navigate(&store, cursor, Key::Right, &margins, TAB);
        }
        assert_eq!(cursor.col, 5);
    }

    #[test]
    fn test_tab_is_crossed_in_one_step() {
        let (store, margins) = setup(b"\tx");
        let cursor = Position::new(0, 3);
        let right = navigate(&store, cursor, Key::Right, &margins, TAB);
        assert_eq!(right.col, 7);
        let back = navigate(&store, right, Key::Left, &margins, TAB);
        assert_eq!(back.col, 3);
    }

    #[test]
    fn test_vertical_move_clamps_to_shorter_line() {
        let (store, margins) = setup(b"abcdef\nxy\nlonger line");
        let cursor = Position::new(0, 8);
        let down = navigate(&store, cursor, Key::Down, &margins, TAB);
        // "xy" ends at column 5 (its newline)
        assert_eq!(down, Position::new(1, 5));
        let down = navigate(&store, down, Key::Down, &margins, TAB);
        assert_eq!(down, Position::new(2, 5));
    }

    #[test]
    fn test_vertical_move_snaps_out_of_tab() {
        let (store, margins) = setup(b"abcdef\n\tz");
        let down = navigate(&store, Position::new(0, 5), Key::Down, &margins, TAB);
        assert_eq!(down, Position::new(1, 3));
    }

    #[test]
    fn test_vertical_move_held_at_margins() {
        let (store, margins) = setup(b"a\nb");
        assert_eq!(margins.bottom, 1);
        let up = navigate(&store, Position::new(0, 3), Key::Up, &margins, TAB);
        assert_eq!(up, Position::new(0, 3));
        let down = navigate(&store, Position::new(1, 3), Key::Down, &margins, TAB);
        assert_eq!(down, Position::new(1, 3));
    }

    #[test]
    fn test_clamp_pulls_cursor_inside() {
        let (store, margins) = setup(b"ab\nc");
        assert_eq!(
            clamp(&store, Position::new(7, 40), &margins, TAB),
            Position::new(1, 4)
        );
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(6, &[3, 4, 8]), 4);
        assert_eq!(snap(8, &[3, 4, 8]), 8);
        assert_eq!(snap(1, &[3, 4, 8]), 3);
        assert_eq!(snap(9, &[]), 9);
    }

    #[test]
    fn test_landing_above_window() {
        let mut store = CellStore::from_flat_buffer(b"a\nb\nc");
        project(&mut store, 1, TAB, 3, 2);
        let nl = store.next(store.head().unwrap());
        // Newline on line 0 lands on line 1, the top row
        assert_eq!(landing(&store, nl, 1, 3, TAB), Some(Position::new(0, 3)));
        // Origin is not visible while scrolled
        assert_eq!(landing(&store, None, 1, 3, TAB), None);
    }
}
