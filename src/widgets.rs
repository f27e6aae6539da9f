//! Reusable clickable UI components.
//!
//! Rendering and click-target registration are co-located so that a button
//! can never be drawn without also becoming tappable (`tests/lint_render.rs`
//! enforces this for `[X]`-style button text).

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// Horizontal tab bar: one row of padded labels with separators, each label
/// registered as a click target at its actual rendered position (CJK widths
/// included).
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// Render the bar into `area` and register one target per tab. Targets
    /// extend halfway into the neighbouring separators (and to the area edges
    /// at both ends) so there are no dead gaps between tabs.
    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let mut spans: Vec<Span> = Vec::new();
        let mut extents: Vec<(u16, u16, u16)> = Vec::new(); // (start, width, action)

        let mut cursor: u16 = 0;
        for (i, (label, style, action_id)) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    self.separator,
                    Style::default().fg(Color::DarkGray),
                ));
                cursor += sep_width;
            }
            let padded = format!(" {} ", label);
            let w = Line::from(padded.as_str()).width() as u16;
            extents.push((cursor, w, *action_id));
            spans.push(Span::styled(padded, *style));
            cursor += w;
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);

        let n = extents.len();
        for i in 0..n {
            let (start, w, action_id) = extents[i];
            let left = if i == 0 {
                0
            } else {
                let (ps, pw, _) = extents[i - 1];
                let prev_end = ps + pw;
                prev_end + (start - prev_end) / 2
            };
            let right = if i == n - 1 {
                area.width
            } else {
                let end = start + w;
                let next_start = extents[i + 1].0;
                end + (next_start - end) / 2
            };
            let tw = right.saturating_sub(left);
            if tw > 0 {
                cs.add_click_target(
                    Rect::new(area.x + left, area.y, tw, area.height.max(1)),
                    action_id,
                );
            }
        }
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Builder pairing rendered [`Line`]s with click actions.
///
/// Lines are annotated as clickable when added; a single
/// [`register_targets`](ClickableList::register_targets) call after layout
/// registers every target at the row its line actually landed on, so
/// inserting a header never silently shifts a button off its target.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)` pairs.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a non-clickable line.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a clickable line bound to a semantic action ID.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Visual height of the whole list when wrapped at `width` columns.
    /// Used to size panels to their content before rendering.
    pub fn visual_height(&self, width: u16) -> u16 {
        if width == 0 {
            return self.lines.len() as u16;
        }
        Paragraph::new(self.lines.clone()).line_count(width) as u16
    }

    /// Consume the builder, returning the lines for rendering.
    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register click targets for all clickable lines.
    ///
    /// * `top_offset`/`bottom_offset` — rows eaten by borders.
    /// * `scroll` — vertical scroll offset in visual rows.
    /// * `wrap_width` — content width when the widget wraps; `0` means each
    ///   logical line occupies exactly one visual row.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
        wrap_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        if wrap_width == 0 {
            for &(line_idx, action_id) in &self.actions {
                if line_idx < scroll {
                    continue;
                }
                let row = content_y + (line_idx - scroll);
                if row < content_end {
                    cs.add_row_target(area, row, action_id);
                }
            }
            return;
        }

        // Wrap-aware path: visual start row of each logical line.
        let w = wrap_width as usize;
        let mut starts: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut heights: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut cum: u16 = 0;
        for line in &self.lines {
            starts.push(cum);
            let lw = line.width();
            let h = if lw <= w { 1 } else { lw.div_ceil(w) as u16 };
            heights.push(h);
            cum += h;
        }

        for &(line_idx, action_id) in &self.actions {
            let li = line_idx as usize;
            if li >= self.lines.len() {
                continue;
            }
            for r in 0..heights[li] {
                let vr = starts[li] + r;
                if vr < scroll {
                    continue;
                }
                let screen_row = content_y + (vr - scroll);
                if screen_row >= content_end {
                    break;
                }
                cs.add_row_target(area, screen_row, action_id);
            }
        }
    }

    /// Render as a bordered paragraph and register targets in one call
    /// (the common case for simple panels).
    pub fn render(self, f: &mut Frame, area: Rect, block: Block<'a>, cs: &mut ClickState) {
        self.register_targets(area, cs, 1, 1, 0, 0);
        f.render_widget(Paragraph::new(self.into_lines()).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clickable_rows_land_after_border() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("header"));
        cl.push_clickable(Line::from("buy"), 10);
        cl.push_clickable(Line::from("toggle"), 11);

        let area = Rect::new(0, 5, 80, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0, 0);

        // "buy" is line 1 → row 5+1+1 = 7; "toggle" → row 8
        assert_eq!(cs.hit_test(10, 7), Some(10));
        assert_eq!(cs.hit_test(10, 8), Some(11));
        assert_eq!(cs.hit_test(10, 6), None);
    }

    #[test]
    fn scrolled_out_rows_are_not_targets() {
        let mut cl = ClickableList::new();
        for i in 0..4 {
            cl.push_clickable(Line::from(format!("item {i}")), 100 + i as u16);
        }
        let area = Rect::new(0, 10, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 1, 2, 0);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(0, 10), Some(102));
        assert_eq!(cs.hit_test(0, 11), Some(103));
    }

    #[test]
    fn targets_clip_at_area_bottom() {
        let mut cl = ClickableList::new();
        for i in 0..20 {
            cl.push_clickable(Line::from(format!("item {i}")), 50 + i as u16);
        }
        // 3 content rows after borders
        let area = Rect::new(0, 0, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0, 0);
        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 3), Some(52));
        assert_eq!(cs.hit_test(0, 4), None);
    }

    #[test]
    fn inserted_header_shifts_targets() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("header 1"));
        cl.push(Line::from("header 2"));
        cl.push_clickable(Line::from("buy item"), 42);

        let area = Rect::new(0, 0, 80, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0, 0);
        assert_eq!(cs.hit_test(0, 3), Some(42));
        assert_eq!(cs.hit_test(0, 2), None);
    }

    #[test]
    fn wrapped_line_is_clickable_on_every_row() {
        let mut cl = ClickableList::new();
        cl.push_clickable(Line::from("123456789012345678901234567890"), 42);
        let area = Rect::new(0, 0, 12, 10);
        let mut cs = ClickState::new();
        // wraps to 3 visual rows at width 10
        cl.register_targets(area, &mut cs, 0, 0, 0, 10);
        assert_eq!(cs.hit_test(5, 0), Some(42));
        assert_eq!(cs.hit_test(5, 1), Some(42));
        assert_eq!(cs.hit_test(5, 2), Some(42));
        assert_eq!(cs.hit_test(5, 3), None);
    }

    #[test]
    fn wrapped_header_pushes_targets_down() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("12345678901234567890")); // 2 rows at width 10
        cl.push_clickable(Line::from("item0"), 10);
        let area = Rect::new(0, 0, 12, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0, 0, 10);
        assert_eq!(cs.hit_test(5, 2), Some(10));
        assert_eq!(cs.hit_test(5, 0), None);
    }

    #[test]
    fn empty_list_registers_nothing() {
        let cl = ClickableList::new();
        assert!(cl.is_empty());
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 80, 10), &mut cs, 1, 1, 0, 0);
        assert!(cs.targets.is_empty());
    }
}
