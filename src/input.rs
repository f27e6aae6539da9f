//! Shared input handling: coordinate conversion, click targets, and event types.
//!
//! Everything here is pure and host-testable; DOM access stays in `main.rs`.

use ratzilla::ratatui::layout::Rect;

/// All input events, normalized from keyboard, mouse and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from the keyboard.
    Key(char),
    /// Backspace (text entry fields).
    Backspace,
    /// Enter / form submit.
    Submit,
    /// Escape — closes overlays, drops a grabbed card.
    Cancel,
    /// A click/tap on a registered target, identified by a semantic action ID.
    Click(u16),
    /// A click/tap on a terminal cell with no registered target (board drops).
    CellClick { col: u16, row: u16 },
}

/// A rectangular region that triggers an action when tapped.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    /// Semantic action ID; constants live in `craft::actions`.
    pub action_id: u16,
}

/// Shared state between the render loop and the click handler.
///
/// Targets are cleared and re-registered every frame, so they always match
/// what is actually on screen.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Convenience: register a full-row target at `row` within `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.targets.push(ClickTarget {
                rect: Rect::new(area.x, row, area.width, 1),
                action_id,
            });
        }
    }

    /// Hit-test a terminal cell against all registered targets.
    /// Later-registered targets win, matching UI layering where overlays are
    /// registered after the screens they cover.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

/// Convert a pixel Y coordinate (relative to the grid container) to a row.
/// Returns `None` when the click is outside the grid or the inputs are bogus.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;
    if row >= terminal_rows {
        return None;
    }
    Some(row)
}

/// Convert a pixel X coordinate (relative to the grid container) to a column.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let cell_width = grid_width / terminal_cols as f64;
    let col = (click_x / cell_width) as u16;
    if col >= terminal_cols {
        return None;
    }
    Some(col)
}

/// Determine whether a screen width (in columns) should use narrow layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}

/// A single-line text entry buffer (topic input, custom item input, search).
#[derive(Debug, Clone, Default)]
pub struct TextEntry {
    pub buffer: String,
}

impl TextEntry {
    pub fn push(&mut self, c: char) {
        // Control characters never belong in a text field.
        if !c.is_control() {
            self.buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Trimmed contents, `None` when effectively empty.
    pub fn submit(&self) -> Option<&str> {
        let t = self.buffer.trim();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── pixel conversion ───────────────────────────────────────────

    #[test]
    fn pixel_to_row_basic() {
        // 30 rows, 450px grid → 15px per row
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(14.9, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
    }

    #[test]
    fn pixel_to_row_rejects_out_of_bounds() {
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 450.0, 0), None);
    }

    #[test]
    fn pixel_to_col_basic() {
        // 80 cols, 640px grid → 8px per col
        assert_eq!(pixel_x_to_col(0.0, 640.0, 80), Some(0));
        assert_eq!(pixel_x_to_col(7.9, 640.0, 80), Some(0));
        assert_eq!(pixel_x_to_col(8.0, 640.0, 80), Some(1));
        assert_eq!(pixel_x_to_col(639.0, 640.0, 80), Some(79));
        assert_eq!(pixel_x_to_col(640.0, 640.0, 80), None);
    }

    #[test]
    fn pixel_conversion_fractional_cells() {
        // 24 rows, 400px → ≈16.67px per row
        assert_eq!(pixel_y_to_row(16.0, 400.0, 24), Some(0));
        assert_eq!(pixel_y_to_row(17.0, 400.0, 24), Some(1));
        assert_eq!(pixel_y_to_row(399.0, 400.0, 24), Some(23));
    }

    // ── hit testing ────────────────────────────────────────────────

    #[test]
    fn hit_test_matches_inside_rect() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(10, 5, 20, 2), 42);
        assert_eq!(cs.hit_test(10, 5), Some(42));
        assert_eq!(cs.hit_test(29, 6), Some(42));
        assert_eq!(cs.hit_test(30, 5), None);
        assert_eq!(cs.hit_test(10, 7), None);
        assert_eq!(cs.hit_test(9, 5), None);
    }

    #[test]
    fn hit_test_later_target_wins() {
        // An overlay registered after the screen it covers takes priority.
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 80, 30), 1);
        cs.add_click_target(Rect::new(20, 10, 40, 10), 2);
        assert_eq!(cs.hit_test(30, 15), Some(2));
        assert_eq!(cs.hit_test(5, 5), Some(1));
    }

    #[test]
    fn row_target_respects_area_bounds() {
        let mut cs = ClickState::new();
        let area = Rect::new(0, 10, 40, 5);
        cs.add_row_target(area, 12, 7);
        cs.add_row_target(area, 20, 8); // outside → ignored
        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(0, 12), Some(7));
    }

    #[test]
    fn clear_targets_resets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 10, 1), 1);
        cs.clear_targets();
        assert_eq!(cs.hit_test(0, 0), None);
    }

    // ── layout ─────────────────────────────────────────────────────

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(40));
        assert!(is_narrow_layout(69));
        assert!(!is_narrow_layout(70));
        assert!(!is_narrow_layout(120));
    }

    // ── text entry ─────────────────────────────────────────────────

    #[test]
    fn text_entry_collects_chars() {
        let mut te = TextEntry::default();
        for c in "量子 cat".chars() {
            te.push(c);
        }
        assert_eq!(te.submit(), Some("量子 cat"));
    }

    #[test]
    fn text_entry_backspace_and_clear() {
        let mut te = TextEntry::default();
        te.push('a');
        te.push('b');
        te.backspace();
        assert_eq!(te.buffer, "a");
        te.clear();
        assert_eq!(te.submit(), None);
    }

    #[test]
    fn text_entry_ignores_control_chars() {
        let mut te = TextEntry::default();
        te.push('\u{8}');
        te.push('\n');
        te.push('x');
        assert_eq!(te.buffer, "x");
    }

    #[test]
    fn text_entry_whitespace_only_is_empty() {
        let mut te = TextEntry::default();
        te.push(' ');
        te.push(' ');
        assert_eq!(te.submit(), None);
    }
}
