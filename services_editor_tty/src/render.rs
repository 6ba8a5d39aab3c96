//! Editor rendering and output
//!
//! Turns an `EditorCore` into a [`Frame`]: one string per text row, with the
//! line-number gutter in the left margin, plus an optional status line.

use editor_core::{EditorCore, EditorMode};

/// One screenful of output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Text rows, top to bottom
    pub rows: Vec<String>,
    /// Bottom status row, if enabled
    pub status: Option<String>,
    /// Cursor as `(column, row)`
    pub cursor: (u16, u16),
}

/// Active prompt shown on the status row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLine<'a> {
    pub label: &'a str,
    pub input: &'a str,
}

/// Editor view for rendering
pub struct EditorView {
    width: usize,
    status_line: bool,
}

impl EditorView {
    pub fn new(width: usize, status_line: bool) -> Self {
        Self { width, status_line }
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    pub fn status_line(&self) -> bool {
        self.status_line
    }

    /// Render the session
    pub fn render(
        &self,
        core: &EditorCore,
        file_label: Option<&str>,
        prompt: Option<PromptLine<'_>>,
    ) -> Frame {
        let capacity = core.capacity();
        let tab_width = core.config().tab_width;
        let left = core.margins().left;

        let mut rows: Vec<String> = vec![String::new(); capacity];

        for (row, number) in core.visible_line_numbers() {
            if let Some(line) = rows.get_mut(row) {
                *line = format!("{:>width$}: ", number, width = left.saturating_sub(2));
            }
        }
        for line in rows.iter_mut().skip(core.projection().rows_in_view) {
            line.push('~');
        }

        for (pos, value) in core.visible_cells() {
            let Some(line) = rows.get_mut(pos.row) else {
                continue;
            };
            match value {
                b'\n' => {}
                b'\t' => put(line, pos.col, &" ".repeat(tab_width)),
                byte => put(line, pos.col, &char::from(byte).to_string()),
            }
        }

        for line in rows.iter_mut() {
            truncate_to(line, self.width);
        }

        let cursor = core.cursor();
        let mut frame = Frame {
            rows,
            status: None,
            cursor: (to_u16(cursor.col), to_u16(cursor.row)),
        };

        if let Some(prompt) = prompt {
            let mut status = format!("{}{}", prompt.label, prompt.input);
            truncate_to(&mut status, self.width);
            frame.cursor = (to_u16(status.chars().count()), to_u16(capacity));
            frame.status = Some(status);
        } else if self.status_line {
            let mut status = self.status_text(core, file_label);
            truncate_to(&mut status, self.width);
            frame.status = Some(status);
        }

        frame
    }

    fn status_text(&self, core: &EditorCore, file_label: Option<&str>) -> String {
        let mut status = String::new();

        status.push_str(core.mode().as_str());
        status.push(' ');

        match file_label {
            Some(label) => status.push_str(label),
            None => status.push_str("[No Name]"),
        }
        if core.dirty() {
            status.push('*');
        }

        let cursor = core.cursor();
        status.push_str(&format!(
            " Ln {}, Col {}",
            core.cursor_line() + 1,
            cursor.col.saturating_sub(core.margins().left) + 1
        ));

        if core.mode() == EditorMode::Prefix {
            status.push_str(" | s:save c:copy x:cut v:paste o:open e:exit");
        } else if core.selection().is_marking() {
            status.push_str(" | marking");
        }

        if !core.status_message().is_empty() {
            status.push_str(" | ");
            status.push_str(core.status_message());
        }

        status
    }
}

impl Default for EditorView {
    fn default() -> Self {
        Self::new(80, true)
    }
}

/// Write `text` at character column `col`, padding with spaces
fn put(line: &mut String, col: usize, text: &str) {
    let len = line.chars().count();
    if len < col {
        line.extend(std::iter::repeat(' ').take(col - len));
    }
    line.push_str(text);
}

fn truncate_to(line: &mut String, width: usize) {
    if let Some((idx, _)) = line.char_indices().nth(width) {
        line.truncate(idx);
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_core::{CoreConfig, Key};

    fn editor(text: &[u8], capacity: usize) -> EditorCore {
        let mut core = EditorCore::new(CoreConfig::default(), capacity);
        core.load_content(text);
        core
    }

    #[test]
    fn test_render_empty_buffer() {
        let view = EditorView::new(40, true);
        let core = EditorCore::new(CoreConfig::default(), 3);

        let frame = view.render(&core, None, None);
        assert_eq!(frame.rows, ["1: ", "~", "~"]);
        assert_eq!(frame.cursor, (3, 0));
        assert!(frame.status.unwrap().starts_with("EDIT [No Name] Ln 1, Col 1"));
    }

    #[test]
    fn test_render_with_content() {
        let view = EditorView::new(40, true);
        let core = editor(b"hello\nworld", 3);

        let frame = view.render(&core, Some("notes.txt"), None);
        assert_eq!(frame.rows, ["1: hello", "2: world", "~"]);
        assert_eq!(frame.cursor, (8, 1));
        assert_eq!(frame.status.as_deref(), Some("EDIT notes.txt Ln 2, Col 6"));
    }

    #[test]
    fn test_render_expands_tabs() {
        let view = EditorView::new(40, false);
        let core = editor(b"\tx", 2);
        let frame = view.render(&core, None, None);
        assert_eq!(frame.rows[0], "1:     x");
        assert_eq!(frame.status, None);
    }

    #[test]
    fn test_gutter_right_aligns_numbers() {
        let text: Vec<u8> = (0..12).flat_map(|i| format!("l{}\n", i).into_bytes()).collect();
        let view = EditorView::new(40, false);
        let core = editor(&text, 4);

        // 13 lines, scrolled to the last four
        let frame = view.render(&core, None, None);
        assert_eq!(frame.rows, ["10: l9", "11: l10", "12: l11", "13: "]);
    }

    #[test]
    fn test_render_clips_to_width() {
        let view = EditorView::new(6, true);
        let core = editor(b"abcdefgh", 2);
        let frame = view.render(&core, Some("long-file-name.txt"), None);
        assert_eq!(frame.rows[0], "1: abc");
        assert_eq!(frame.status.unwrap().chars().count(), 6);
    }

    #[test]
    fn test_dirty_and_mode_in_status() {
        let view = EditorView::new(80, true);
        let mut core = editor(b"a", 2);
        core.apply_key(Key::Char('b'));
        core.apply_key(Key::Escape);

        let status = view.render(&core, Some("f"), None).status.unwrap();
        assert!(status.starts_with("ESC f* "));
        assert!(status.contains("s:save"));
    }

    #[test]
    fn test_prompt_replaces_status() {
        let view = EditorView::new(80, true);
        let core = editor(b"abc", 3);
        let prompt = PromptLine {
            label: "file name: ",
            input: "out.txt",
        };

        let frame = view.render(&core, None, Some(prompt));
        assert_eq!(frame.status.as_deref(), Some("file name: out.txt"));
        assert_eq!(frame.cursor, (18, 3));
    }
}
