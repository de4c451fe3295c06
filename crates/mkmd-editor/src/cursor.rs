//! Cursor and selection.
//!
//! A `Cursor` is a position plus an optional selection anchor. It does not
//! own the document; motions take it as a parameter and always leave the
//! cursor on a valid position (`line < line_count`, `col <= line_len`).
//!
//! # Selection
//!
//! Every motion takes `extend: bool`. When true and no anchor exists, the
//! anchor is dropped at the pre-move position, so Shift+Arrow grows a
//! selection from where it started. When false the anchor is cleared. An
//! anchor equal to the cursor is an empty selection, which is distinct from
//! no selection at all.
//!
//! Vertical motion clamps the column to the target line; there is no
//! remembered column.

use crate::document::Document;
use crate::position::{Position, Range};
use crate::text::is_word_rune;

/// A cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    DocStart,
    DocEnd,
    /// Up by this many lines.
    PageUp(usize),
    /// Down by this many lines.
    PageDown(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    anchor: Option<Position>,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            anchor: None,
        }
    }

    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self { pos, anchor: None }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.anchor.is_some()
    }

    /// The normalized selection, if an anchor is set.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.anchor.map(|anchor| Range::ordered(anchor, self.pos))
    }

    // -- Placement ----------------------------------------------------------

    /// Move to `pos` (clamped). The anchor is untouched.
    pub fn set_position(&mut self, doc: &Document, pos: Position) {
        self.pos = doc.clamp(pos);
    }

    pub const fn set_anchor_at(&mut self, pos: Position) {
        self.anchor = Some(pos);
    }

    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Re-establish the invariants after the document changed underneath.
    /// A stale anchor is clamped too.
    pub fn clamp(&mut self, doc: &Document) {
        self.pos = doc.clamp(self.pos);
        if let Some(anchor) = self.anchor {
            self.anchor = Some(doc.clamp(anchor));
        }
    }

    /// Anchor at the start of the document, cursor at its end.
    pub fn select_all(&mut self, doc: &Document) {
        self.anchor = Some(Position::ZERO);
        self.pos = doc.end();
    }

    // -- Motions ------------------------------------------------------------

    /// Apply `motion`, extending or clearing the selection.
    pub fn apply(&mut self, doc: &Document, motion: Motion, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.pos);
            }
        } else {
            self.anchor = None;
        }
        self.pos = target(doc, doc.clamp(self.pos), motion);
    }
}

fn target(doc: &Document, pos: Position, motion: Motion) -> Position {
    let last = doc.line_count() - 1;
    let on_line = |line: usize| Position::new(line, pos.col.min(doc.line_len(line)));

    match motion {
        Motion::Left if pos.col > 0 => Position::new(pos.line, pos.col - 1),
        Motion::Left if pos.line > 0 => Position::new(pos.line - 1, doc.line_len(pos.line - 1)),
        Motion::Right if pos.col < doc.line_len(pos.line) => Position::new(pos.line, pos.col + 1),
        Motion::Right if pos.line < last => Position::new(pos.line + 1, 0),
        Motion::Left | Motion::Right => pos,
        Motion::Up => on_line(pos.line.saturating_sub(1)),
        Motion::Down => on_line((pos.line + 1).min(last)),
        Motion::PageUp(n) => on_line(pos.line.saturating_sub(n)),
        Motion::PageDown(n) => on_line(pos.line.saturating_add(n).min(last)),
        Motion::WordLeft => word_left(doc, pos),
        Motion::WordRight => word_right(doc, pos),
        Motion::LineStart => Position::new(pos.line, 0),
        Motion::LineEnd => Position::new(pos.line, doc.line_len(pos.line)),
        Motion::DocStart => Position::ZERO,
        Motion::DocEnd => doc.end(),
    }
}

/// At end of line: start of the next line. Otherwise skip the word under
/// the cursor, then the separators after it.
fn word_right(doc: &Document, pos: Position) -> Position {
    let runes: Vec<char> = doc.line(pos.line).chars().collect();
    if pos.col >= runes.len() {
        if pos.line + 1 < doc.line_count() {
            return Position::new(pos.line + 1, 0);
        }
        return pos;
    }
    let mut col = pos.col;
    while col < runes.len() && is_word_rune(runes[col]) {
        col += 1;
    }
    while col < runes.len() && !is_word_rune(runes[col]) {
        col += 1;
    }
    Position::new(pos.line, col)
}

/// At column 0: end of the previous line. Otherwise skip separators to the
/// left, then the word before them.
fn word_left(doc: &Document, pos: Position) -> Position {
    if pos.col == 0 {
        if pos.line > 0 {
            return Position::new(pos.line - 1, doc.line_len(pos.line - 1));
        }
        return pos;
    }
    let runes: Vec<char> = doc.line(pos.line).chars().collect();
    let mut col = pos.col.min(runes.len());
    while col > 0 && !is_word_rune(runes[col - 1]) {
        col -= 1;
    }
    while col > 0 && is_word_rune(runes[col - 1]) {
        col -= 1;
    }
    Position::new(pos.line, col)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_text(text)
    }

    fn moved(d: &Document, from: (usize, usize), motion: Motion) -> (usize, usize) {
        let mut c = Cursor::at(Position::new(from.0, from.1));
        c.apply(d, motion, false);
        (c.line(), c.col())
    }

    // -- Character motions --------------------------------------------------

    #[test]
    fn left_right_wrap_lines() {
        let d = doc("ab\ncd");
        assert_eq!(moved(&d, (1, 0), Motion::Left), (0, 2));
        assert_eq!(moved(&d, (0, 2), Motion::Right), (1, 0));
        assert_eq!(moved(&d, (0, 0), Motion::Left), (0, 0));
        assert_eq!(moved(&d, (1, 2), Motion::Right), (1, 2));
    }

    #[test]
    fn vertical_clamps_column() {
        let d = doc("long line\nab\nanother long");
        assert_eq!(moved(&d, (0, 8), Motion::Down), (1, 2));
        assert_eq!(moved(&d, (1, 2), Motion::Down), (2, 2));
        assert_eq!(moved(&d, (0, 3), Motion::Up), (0, 3));
        assert_eq!(moved(&d, (2, 3), Motion::Down), (2, 3));
    }

    #[test]
    fn pages_clamp_to_document() {
        let d = doc("a\nb\nc\nd\ne");
        assert_eq!(moved(&d, (1, 0), Motion::PageDown(3)), (4, 0));
        assert_eq!(moved(&d, (4, 0), Motion::PageDown(3)), (4, 0));
        assert_eq!(moved(&d, (2, 0), Motion::PageUp(3)), (0, 0));
    }

    #[test]
    fn line_and_document_ends() {
        let d = doc("héllo\nworld!");
        assert_eq!(moved(&d, (0, 2), Motion::LineEnd), (0, 5));
        assert_eq!(moved(&d, (0, 2), Motion::LineStart), (0, 0));
        assert_eq!(moved(&d, (0, 2), Motion::DocEnd), (1, 6));
        assert_eq!(moved(&d, (1, 2), Motion::DocStart), (0, 0));
    }

    // -- Word motions -------------------------------------------------------

    #[test]
    fn word_right_skips_word_then_separators() {
        let d = doc("foo_bar, baz\nnext");
        assert_eq!(moved(&d, (0, 0), Motion::WordRight), (0, 9));
        assert_eq!(moved(&d, (0, 7), Motion::WordRight), (0, 9));
        assert_eq!(moved(&d, (0, 9), Motion::WordRight), (0, 12));
        assert_eq!(moved(&d, (0, 12), Motion::WordRight), (1, 0));
        assert_eq!(moved(&d, (1, 4), Motion::WordRight), (1, 4));
    }

    #[test]
    fn word_left_skips_separators_then_word() {
        let d = doc("prev\nfoo, bar");
        assert_eq!(moved(&d, (1, 8), Motion::WordLeft), (1, 5));
        assert_eq!(moved(&d, (1, 5), Motion::WordLeft), (1, 0));
        assert_eq!(moved(&d, (1, 0), Motion::WordLeft), (0, 4));
        assert_eq!(moved(&d, (0, 0), Motion::WordLeft), (0, 0));
    }

    #[test]
    fn word_motion_over_unicode_letters() {
        let d = doc("héllo wörld");
        assert_eq!(moved(&d, (0, 0), Motion::WordRight), (0, 6));
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn extend_anchors_once() {
        let d = doc("abcdef");
        let mut c = Cursor::at(Position::new(0, 1));
        c.apply(&d, Motion::Right, true);
        c.apply(&d, Motion::Right, true);
        assert_eq!(c.anchor(), Some(Position::new(0, 1)));
        assert_eq!(
            c.selection(),
            Some(Range::ordered(Position::new(0, 1), Position::new(0, 3)))
        );
        c.apply(&d, Motion::Left, false);
        assert!(!c.has_selection());
    }

    #[test]
    fn backwards_selection_normalizes() {
        let d = doc("abc\ndef");
        let mut c = Cursor::at(Position::new(1, 2));
        c.apply(&d, Motion::Up, true);
        let sel = c.selection().unwrap();
        assert_eq!(sel.start, Position::new(0, 2));
        assert_eq!(sel.end, Position::new(1, 2));
    }

    #[test]
    fn select_all_spans_document() {
        let d = doc("ab\ncde");
        let mut c = Cursor::new();
        c.select_all(&d);
        assert_eq!(c.anchor(), Some(Position::ZERO));
        assert_eq!(c.position(), Position::new(1, 3));
    }

    #[test]
    fn clamp_fixes_cursor_and_stale_anchor() {
        let mut c = Cursor::at(Position::new(5, 5));
        c.set_anchor_at(Position::new(9, 9));
        let d = doc("ab");
        c.clamp(&d);
        assert_eq!(c.position(), Position::new(0, 2));
        assert_eq!(c.anchor(), Some(Position::new(0, 2)));
    }
}
