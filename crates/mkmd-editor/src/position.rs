//! Positions and spans in a document.
//!
//! Coordinates are 0-indexed and columns count runes, so `Position` can be
//! fed straight into the helpers in [`crate::text`]. Only the status line
//! shows 1-indexed numbers.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cursor or match location. Field order gives the derived ordering:
/// earlier lines first, then earlier columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// `line:col`, 1-indexed as the user counts.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// The text between two positions, `start` inclusive and `end` exclusive.
/// Always normalized so that `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// The span between `a` and `b`, whichever comes first. A selection
    /// anchor may sit after the cursor.
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The columns of `line` inside this span as `[from, to)`, both
    /// clamped to `line_len`. Lines strictly between start and end are
    /// covered whole. `None` for lines outside the span.
    #[must_use]
    pub fn cols_on_line(self, line: usize, line_len: usize) -> Option<(usize, usize)> {
        if !(self.start.line..=self.end.line).contains(&line) {
            return None;
        }
        let from = if line == self.start.line { self.start.col.min(line_len) } else { 0 };
        let to = if line == self.end.line { self.end.col.min(line_len) } else { line_len };
        Some((from, to))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    #[test]
    fn earlier_line_sorts_first() {
        assert!(pos(0, 9) < pos(1, 0));
        assert!(pos(2, 1) < pos(2, 3));
        assert_eq!(pos(1, 1).max(Position::ZERO), pos(1, 1));
    }

    #[test]
    fn shown_one_indexed() {
        assert_eq!(pos(0, 0).to_string(), "1:1");
        assert_eq!(pos(41, 9).to_string(), "42:10");
    }

    #[test]
    fn ordered_normalizes_a_backward_selection() {
        let r = Range::ordered(pos(4, 2), pos(1, 7));
        assert_eq!((r.start, r.end), (pos(1, 7), pos(4, 2)));
        assert!(!r.is_empty());
        assert!(Range::ordered(pos(3, 3), pos(3, 3)).is_empty());
    }

    #[test]
    fn cols_on_line_for_a_three_line_span() {
        let r = Range::ordered(pos(1, 3), pos(3, 2));
        assert_eq!(r.cols_on_line(0, 10), None);
        assert_eq!(r.cols_on_line(1, 10), Some((3, 10)));
        assert_eq!(r.cols_on_line(2, 6), Some((0, 6)));
        assert_eq!(r.cols_on_line(3, 10), Some((0, 2)));
        assert_eq!(r.cols_on_line(4, 10), None);
    }

    #[test]
    fn cols_on_line_clamps_to_short_lines() {
        let r = Range::ordered(pos(0, 8), pos(0, 20));
        assert_eq!(r.cols_on_line(0, 5), Some((5, 5)));
    }
}
