//! Viewport: which part of the document is on screen.
//!
//! `offset_y` is the first visible line. `offset_x` is the first visible
//! **display column**, not a rune index, so a horizontal offset can land in
//! the middle of a wide glyph. [`Viewport::visible_start`] resolves that by
//! turning the hidden half into leading blank cells.
//!
//! The bottom terminal row belongs to the status line, so `text_rows` is one
//! less than the terminal height.
//!
//! # Momentum
//!
//! Vertical wheel notches accumulate a signed momentum instead of scrolling
//! directly. Each frame tick moves `offset_y` by a share of it and decays it:
//!
//! ```text
//! step     = max(1, round(|m| * factor))   when |m| > 0.1
//! offset_y = clamp(offset_y ± step, 0, line_count - text_rows)
//! m        = 0 on overshooting a bound, else m * decay; |m| < 0.1 → 0
//! ```

use crate::config::EditorConfig;
use crate::document::Document;
use crate::position::Position;
use crate::text::{char_width, display_col};

const MOMENTUM_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset_y: usize,
    offset_x: usize,
    width: usize,
    text_rows: usize,
    momentum: f64,
    margin: usize,
    momentum_cap: f64,
    momentum_decay: f64,
    momentum_factor: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(config: &EditorConfig) -> Self {
        Self {
            offset_y: 0,
            offset_x: 0,
            width: 80,
            text_rows: 23,
            momentum: 0.0,
            margin: config.scroll_margin,
            momentum_cap: config.momentum_cap,
            momentum_decay: config.momentum_decay,
            momentum_factor: config.momentum_factor,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn offset_y(&self) -> usize {
        self.offset_y
    }

    #[inline]
    #[must_use]
    pub const fn offset_x(&self) -> usize {
        self.offset_x
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Rows available for text, excluding the status line.
    #[inline]
    #[must_use]
    pub const fn text_rows(&self) -> usize {
        self.text_rows
    }

    #[inline]
    #[must_use]
    pub const fn momentum(&self) -> f64 {
        self.momentum
    }

    // -- Geometry -----------------------------------------------------------

    /// Adopt a new terminal size. One row is kept for the status line.
    pub const fn resize(&mut self, cols: usize, rows: usize) {
        self.width = cols;
        self.text_rows = rows.saturating_sub(1);
    }

    /// Back to the top-left corner with no momentum.
    pub const fn reset(&mut self) {
        self.offset_y = 0;
        self.offset_x = 0;
        self.momentum = 0.0;
    }

    /// Scroll just enough to bring `pos` on screen, keeping `margin`
    /// display columns of context on either side horizontally.
    pub fn ensure_cursor_visible(&mut self, doc: &Document, pos: Position) {
        if pos.line < self.offset_y {
            self.offset_y = pos.line;
        }
        if self.text_rows > 0 && pos.line >= self.offset_y + self.text_rows {
            self.offset_y = pos.line + 1 - self.text_rows;
        }

        let col = display_col(doc.line(pos.line), pos.col);
        let right_span = self.width.saturating_sub(1 + self.margin);
        if col < self.offset_x + self.margin {
            self.offset_x = col.saturating_sub(self.margin);
        }
        if col > self.offset_x + right_span {
            self.offset_x = col - right_span;
        }
    }

    /// First rune of `line` to draw and how many blank cells precede it.
    ///
    /// When `offset_x` falls inside a wide glyph, that glyph is skipped and
    /// its still-visible columns are reported as blanks.
    #[must_use]
    pub fn visible_start(&self, line: &str) -> (usize, usize) {
        let mut remaining = self.offset_x;
        for (i, ch) in line.chars().enumerate() {
            if remaining == 0 {
                return (i, 0);
            }
            let w = char_width(ch);
            if remaining >= w {
                remaining -= w;
            } else {
                return (i + 1, w - remaining);
            }
        }
        (line.chars().count(), 0)
    }

    /// Screen cell of `pos`, or `None` when it is scrolled out of view.
    #[must_use]
    pub fn screen_position(&self, doc: &Document, pos: Position) -> Option<(usize, usize)> {
        let row = pos.line.checked_sub(self.offset_y)?;
        let col = display_col(doc.line(pos.line), pos.col).checked_sub(self.offset_x)?;
        (row < self.text_rows && col < self.width).then_some((col, row))
    }

    /// Document position under screen cell `(x, y)`.
    ///
    /// `None` on the status row or below the last line. A click on the left
    /// half of a glyph lands before it, on the right half of a wide glyph
    /// after it.
    #[must_use]
    pub fn position_at(&self, doc: &Document, x: usize, y: usize) -> Option<Position> {
        if y >= self.text_rows {
            return None;
        }
        let line = self.offset_y + y;
        if line >= doc.line_count() {
            return None;
        }

        let target = x + self.offset_x;
        let mut cur = 0;
        for (i, ch) in doc.line(line).chars().enumerate() {
            let w = char_width(ch);
            if target < cur + w {
                let col = if w > 1 && target - cur >= w / 2 { i + 1 } else { i };
                return Some(Position::new(line, col));
            }
            cur += w;
        }
        Some(Position::new(line, doc.line_len(line)))
    }

    // -- Scrolling ----------------------------------------------------------

    /// Shift `offset_x` by `delta` columns, stopping at zero.
    pub const fn scroll_horizontal(&mut self, delta: isize) {
        self.offset_x = self.offset_x.saturating_add_signed(delta);
    }

    /// Accumulate wheel momentum, capped in both directions.
    pub fn add_momentum(&mut self, delta: f64) {
        self.momentum = (self.momentum + delta).clamp(-self.momentum_cap, self.momentum_cap);
    }

    /// Advance momentum scrolling by one frame. Returns whether `offset_y`
    /// moved.
    pub fn apply_momentum(&mut self, line_count: usize) -> bool {
        if self.momentum == 0.0 {
            return false;
        }
        let before = self.offset_y;

        if self.momentum.abs() > MOMENTUM_FLOOR {
            let step = step_for(self.momentum * self.momentum_factor);
            let max_offset = line_count.saturating_sub(self.text_rows);
            if self.momentum > 0.0 {
                let next = self.offset_y + step;
                if next > max_offset {
                    self.offset_y = max_offset;
                    self.momentum = 0.0;
                } else {
                    self.offset_y = next;
                }
            } else if let Some(next) = self.offset_y.checked_sub(step) {
                self.offset_y = next;
            } else {
                self.offset_y = 0;
                self.momentum = 0.0;
            }
        }

        self.momentum *= self.momentum_decay;
        if self.momentum.abs() < MOMENTUM_FLOOR {
            self.momentum = 0.0;
        }
        tracing::trace!(offset_y = self.offset_y, momentum = self.momentum, "momentum tick");
        self.offset_y != before
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

/// Lines to move for a scaled momentum value: rounded, at least one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn step_for(scaled: f64) -> usize {
    (scaled.abs().round() as usize).max(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(cols: usize, rows: usize) -> Viewport {
        let mut vp = Viewport::default();
        vp.resize(cols, rows);
        vp
    }

    fn numbered(n: usize) -> Document {
        Document::from_lines((0..n).map(|i| format!("line {i}")).collect())
    }

    // -- Cursor visibility --------------------------------------------------

    #[test]
    fn status_row_is_reserved() {
        let vp = viewport(80, 24);
        assert_eq!(vp.text_rows(), 23);
        assert_eq!(viewport(80, 0).text_rows(), 0);
    }

    #[test]
    fn vertical_follow() {
        let d = numbered(100);
        let mut vp = viewport(80, 11);
        vp.ensure_cursor_visible(&d, Position::new(50, 0));
        assert_eq!(vp.offset_y(), 41);
        vp.ensure_cursor_visible(&d, Position::new(45, 0));
        assert_eq!(vp.offset_y(), 41);
        vp.ensure_cursor_visible(&d, Position::new(3, 0));
        assert_eq!(vp.offset_y(), 3);
    }

    #[test]
    fn horizontal_margin() {
        let d = Document::from_text(&"x".repeat(200));
        let mut vp = viewport(20, 5);
        vp.ensure_cursor_visible(&d, Position::new(0, 14));
        assert_eq!(vp.offset_x(), 0);
        vp.ensure_cursor_visible(&d, Position::new(0, 15));
        assert_eq!(vp.offset_x(), 1);
        vp.ensure_cursor_visible(&d, Position::new(0, 100));
        assert_eq!(vp.offset_x(), 86);
        vp.ensure_cursor_visible(&d, Position::new(0, 88));
        assert_eq!(vp.offset_x(), 83);
        vp.ensure_cursor_visible(&d, Position::new(0, 2));
        assert_eq!(vp.offset_x(), 0);
    }

    #[test]
    fn horizontal_margin_counts_display_columns() {
        let d = Document::from_text(&"世".repeat(20));
        let mut vp = viewport(20, 5);
        // Rune 8 sits at display column 16.
        vp.ensure_cursor_visible(&d, Position::new(0, 8));
        assert_eq!(vp.offset_x(), 2);
    }

    // -- Wide glyphs --------------------------------------------------------

    #[test]
    fn offset_inside_wide_glyph_yields_blank() {
        let mut vp = viewport(10, 5);
        vp.scroll_horizontal(1);
        assert_eq!(vp.visible_start("a世b"), (1, 0));
        vp.scroll_horizontal(1);
        assert_eq!(vp.visible_start("a世b"), (2, 1));
        vp.scroll_horizontal(1);
        assert_eq!(vp.visible_start("a世b"), (2, 0));
        vp.scroll_horizontal(10);
        assert_eq!(vp.visible_start("a世b"), (3, 0));
    }

    #[test]
    fn screen_position_accounts_for_offsets() {
        let d = Document::from_text("a世b\nxyz");
        let mut vp = viewport(10, 5);
        assert_eq!(vp.screen_position(&d, Position::new(0, 2)), Some((3, 0)));
        vp.scroll_horizontal(4);
        assert_eq!(vp.screen_position(&d, Position::new(0, 2)), None);
        assert_eq!(vp.screen_position(&d, Position::new(0, 3)), Some((0, 0)));
    }

    // -- Clicks -------------------------------------------------------------

    #[test]
    fn click_maps_to_rune() {
        let d = Document::from_text("a世b\nshort");
        let vp = viewport(20, 5);
        assert_eq!(vp.position_at(&d, 0, 0), Some(Position::new(0, 0)));
        assert_eq!(vp.position_at(&d, 1, 0), Some(Position::new(0, 1)));
        assert_eq!(vp.position_at(&d, 2, 0), Some(Position::new(0, 2)));
        assert_eq!(vp.position_at(&d, 3, 0), Some(Position::new(0, 2)));
        assert_eq!(vp.position_at(&d, 15, 1), Some(Position::new(1, 5)));
    }

    #[test]
    fn click_outside_text_is_ignored() {
        let d = Document::from_text("one\ntwo");
        let vp = viewport(20, 5);
        assert_eq!(vp.position_at(&d, 0, 2), None);
        assert_eq!(vp.position_at(&d, 0, 4), None);
    }

    // -- Momentum -----------------------------------------------------------

    #[test]
    fn momentum_is_capped() {
        let mut vp = Viewport::default();
        for _ in 0..40 {
            vp.add_momentum(15.0);
        }
        assert!((vp.momentum() - 250.0).abs() < f64::EPSILON);
        for _ in 0..80 {
            vp.add_momentum(-15.0);
        }
        assert!((vp.momentum() + 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn momentum_sequence_decays_to_rest() {
        let mut vp = viewport(80, 11);
        vp.add_momentum(15.0);
        let mut offsets = Vec::new();
        while vp.momentum() != 0.0 {
            vp.apply_momentum(1_000);
            offsets.push(vp.offset_y());
        }
        // 15 → step 2, then 12.75 → 1, and one line per tick after that.
        assert_eq!(&offsets[..3], &[2, 3, 4]);
        assert!(offsets.windows(2).all(|w| w[1] >= w[0]));
        assert!(!vp.apply_momentum(1_000));
    }

    #[test]
    fn momentum_stops_at_bounds() {
        let mut vp = viewport(80, 11);
        vp.add_momentum(-50.0);
        assert!(!vp.apply_momentum(100));
        assert_eq!(vp.offset_y(), 0);
        assert!(vp.momentum() == 0.0);

        vp.add_momentum(250.0);
        assert!(vp.apply_momentum(30));
        assert_eq!(vp.offset_y(), 20);
        assert!(vp.momentum() == 0.0);
    }

    #[test]
    fn short_document_never_scrolls() {
        let mut vp = viewport(80, 24);
        vp.add_momentum(100.0);
        assert!(!vp.apply_momentum(5));
        assert_eq!(vp.offset_y(), 0);
    }

    #[test]
    fn horizontal_scroll_floors_at_zero() {
        let mut vp = Viewport::default();
        vp.scroll_horizontal(3);
        vp.scroll_horizontal(-2);
        assert_eq!(vp.offset_x(), 1);
        vp.scroll_horizontal(-3);
        assert_eq!(vp.offset_x(), 0);
    }
}
