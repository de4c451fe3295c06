//! Document: the editable line store.
//!
//! A `Document` is an ordered `Vec<String>` of lines without terminators.
//! It always holds at least one line; the empty document is `[""]`.
//!
//! # Design choices
//!
//! - **Flat lines, no rope.** Every edit touches one line or splices the
//!   vector. Files past a comfortable size are handled by loading them in
//!   fixed windows (see [`chunk`](crate::chunk)), not by a smarter store.
//!
//! - **Columns are rune offsets.** Byte offsets never leak out; the
//!   conversion happens in [`text`](crate::text).
//!
//! - **No history, no cursor.** The session snapshots before each mutation
//!   and re-clamps the cursor after.
//!
//! - **Word count is cached.** Every mutating method drops the cache.

use std::cell::Cell;

use crate::position::{Position, Range};
use crate::text;

#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
    word_count: Cell<Option<usize>>,
}

impl Document {
    /// The empty document, `[""]`.
    #[must_use]
    pub fn new() -> Self {
        Self::from_lines(Vec::new())
    }

    /// Adopt `lines`; an empty vector becomes `[""]`.
    #[must_use]
    pub fn from_lines(mut lines: Vec<String>) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            word_count: Cell::new(None),
        }
    }

    /// Split `text` on `\n` into a document. Test and paste helper.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.split('\n').map(str::to_owned).collect())
    }

    // -- Queries --------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line `idx`, or `""` past the end.
    #[must_use]
    pub fn line(&self, idx: usize) -> &str {
        self.lines.get(idx).map_or("", String::as_str)
    }

    /// Rune length of line `idx`; 0 past the end.
    #[must_use]
    pub fn line_len(&self, idx: usize) -> usize {
        text::rune_len(self.line(idx))
    }

    /// Last line, at its end.
    #[must_use]
    pub fn end(&self) -> Position {
        let last = self.lines.len() - 1;
        Position::new(last, self.line_len(last))
    }

    /// The nearest valid position: line below `line_count`, col within the line.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    /// Text covered by `range`, lines joined with `\n`.
    #[must_use]
    pub fn text_in(&self, range: Range) -> String {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);
        if start.line == end.line {
            return text::substring(self.line(start.line), start.col, end.col).to_owned();
        }

        let mut out = String::new();
        let (_, head) = text::split_at(self.line(start.line), start.col);
        out.push_str(head);
        for line in &self.lines[start.line + 1..end.line] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(text::split_at(self.line(end.line), end.col).0);
        out
    }

    /// Whitespace-delimited tokens over all lines, cached until the next edit.
    #[must_use]
    pub fn word_count(&self) -> usize {
        if let Some(n) = self.word_count.get() {
            return n;
        }
        let n = self
            .lines
            .iter()
            .map(|l| l.split_whitespace().count())
            .sum();
        self.word_count.set(Some(n));
        n
    }

    /// Whether a cached word count is held. Exposed for tests.
    #[must_use]
    pub fn word_count_cached(&self) -> bool {
        self.word_count.get().is_some()
    }

    /// Drop the cached word count.
    pub fn invalidate(&self) {
        self.word_count.set(None);
    }

    // -- Mutations ------------------------------------------------------------

    /// Replace every line. An empty vector becomes `[""]`.
    pub fn replace_all(&mut self, lines: Vec<String>) {
        *self = Self::from_lines(lines);
    }

    /// Insert single-line `s` at `pos`. Returns the position after it.
    pub fn insert_text(&mut self, pos: Position, s: &str) -> Position {
        let pos = self.clamp(pos);
        self.invalidate();
        let line = &mut self.lines[pos.line];
        *line = text::insert(line, pos.col, s);
        Position::new(pos.line, pos.col + text::rune_len(s))
    }

    /// Split the line at `pos`. The new line starts with the leading
    /// whitespace of the original line, and the returned position sits just
    /// after that indent.
    pub fn split_line(&mut self, pos: Position) -> Position {
        let pos = self.clamp(pos);
        self.invalidate();
        let current = &self.lines[pos.line];
        let indent = text::leading_indent(current).to_owned();
        let (head, tail) = text::split_at(current, pos.col);
        let (head, tail) = (head.to_owned(), format!("{indent}{tail}"));

        self.lines[pos.line] = head;
        self.lines.insert(pos.line + 1, tail);
        Position::new(pos.line + 1, text::rune_len(&indent))
    }

    /// Append line `idx + 1` to line `idx`. Returns `false` on the last line.
    pub fn join_with_next(&mut self, idx: usize) -> bool {
        if idx + 1 >= self.lines.len() {
            return false;
        }
        self.invalidate();
        let next = self.lines.remove(idx + 1);
        self.lines[idx].push_str(&next);
        true
    }

    /// Delete the runes in `[col, col + 1)` on `line`. Returns `false` at
    /// end of line.
    pub fn delete_char(&mut self, pos: Position) -> bool {
        let pos = self.clamp(pos);
        if pos.col >= self.line_len(pos.line) {
            return false;
        }
        self.invalidate();
        let line = &mut self.lines[pos.line];
        *line = text::delete(line, pos.col, pos.col + 1);
        true
    }

    /// Remove `range`. Multi-line ranges join the head of the first line to
    /// the tail of the last. Returns the (clamped) start.
    pub fn delete_range(&mut self, range: Range) -> Position {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);
        if start >= end {
            return start;
        }
        self.invalidate();

        if start.line == end.line {
            let line = &mut self.lines[start.line];
            *line = text::delete(line, start.col, end.col);
            return start;
        }

        let tail = text::split_at(&self.lines[end.line], end.col).1.to_owned();
        let head = &mut self.lines[start.line];
        head.truncate(text::byte_offset(head, start.col));
        head.push_str(&tail);
        self.lines.drain(start.line + 1..=end.line);
        start
    }

    /// Insert `pieces` (a `\n`-split string) at `pos`. The first piece joins
    /// the head of the line, the last piece is followed by its tail. Returns
    /// the position just after the last piece.
    pub fn insert_pieces(&mut self, pos: Position, pieces: &[&str]) -> Position {
        match pieces {
            [] => self.clamp(pos),
            [single] => self.insert_text(pos, single),
            [first, middle @ .., last] => {
                let pos = self.clamp(pos);
                self.invalidate();
                let (head, tail) = text::split_at(&self.lines[pos.line], pos.col);
                let first_line = format!("{head}{first}");
                let last_line = format!("{last}{tail}");

                self.lines[pos.line] = first_line;
                let inserted = middle
                    .iter()
                    .map(|s| (*s).to_owned())
                    .chain(std::iter::once(last_line));
                self.lines.splice(pos.line + 1..pos.line + 1, inserted);
                Position::new(pos.line + pieces.len() - 1, text::rune_len(last))
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines
    }
}

impl Eq for Document {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_text(text)
    }

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn empty_is_one_blank_line() {
        let d = Document::from_lines(Vec::new());
        assert_eq!(d.lines(), &[String::new()]);
        assert_eq!(d.line_count(), 1);
        assert_eq!(d.end(), Position::ZERO);
    }

    #[test]
    fn line_past_end_is_empty() {
        let d = doc("a\nb");
        assert_eq!(d.line(5), "");
        assert_eq!(d.line_len(5), 0);
    }

    #[test]
    fn clamp_pulls_into_document() {
        let d = doc("héllo\nab");
        assert_eq!(d.clamp(pos(9, 9)), pos(1, 2));
        assert_eq!(d.clamp(pos(0, 9)), pos(0, 5));
    }

    // -- Splitting and joining ----------------------------------------------

    #[test]
    fn split_line_copies_indent_of_original() {
        let mut d = doc("    - item text");
        let p = d.split_line(pos(0, 10));
        assert_eq!(d.lines(), &["    - item", "     text"]);
        assert_eq!(p, pos(1, 4));
    }

    #[test]
    fn split_inside_indent_duplicates_full_indent() {
        let mut d = doc("\t\tx");
        let p = d.split_line(pos(0, 1));
        assert_eq!(d.lines(), &["\t", "\t\t\tx"]);
        assert_eq!(p, pos(1, 2));
    }

    #[test]
    fn join_with_next() {
        let mut d = doc("ab\ncd\nef");
        assert!(d.join_with_next(0));
        assert_eq!(d.lines(), &["abcd", "ef"]);
        assert!(!d.join_with_next(1));
    }

    // -- Deleting -----------------------------------------------------------

    #[test]
    fn delete_char_at_end_of_line_is_refused() {
        let mut d = doc("ab");
        assert!(!d.delete_char(pos(0, 2)));
        assert!(d.delete_char(pos(0, 0)));
        assert_eq!(d.line(0), "b");
    }

    #[test]
    fn delete_range_single_line() {
        let mut d = doc("hello world");
        let p = d.delete_range(Range::ordered(pos(0, 5), pos(0, 11)));
        assert_eq!(d.lines(), &["hello"]);
        assert_eq!(p, pos(0, 5));
    }

    #[test]
    fn delete_range_multi_line_merges_ends() {
        let mut d = doc("alpha\nbeta\ngamma\ndelta");
        let p = d.delete_range(Range::ordered(pos(0, 2), pos(2, 3)));
        assert_eq!(d.lines(), &["alma", "delta"]);
        assert_eq!(p, pos(0, 2));
    }

    // -- Inserting ----------------------------------------------------------

    #[test]
    fn insert_pieces_single_and_multi() {
        let mut d = doc("ab");
        assert_eq!(d.insert_pieces(pos(0, 1), &["XY"]), pos(0, 3));
        assert_eq!(d.lines(), &["aXYb"]);

        let mut d = doc("start end");
        let p = d.insert_pieces(pos(0, 6), &["one", "two", "three "]);
        assert_eq!(d.lines(), &["start one", "two", "three end"]);
        assert_eq!(p, pos(2, 6));
    }

    #[test]
    fn text_in_spans_lines() {
        let d = doc("alpha\nbeta\ngamma");
        assert_eq!(d.text_in(Range::ordered(pos(0, 3), pos(2, 2))), "ha\nbeta\nga");
        assert_eq!(d.text_in(Range::ordered(pos(1, 1), pos(1, 3))), "et");
    }

    #[test]
    fn pieces_round_trip_through_text_in() {
        let mut d = doc("xy");
        let end = d.insert_pieces(pos(0, 1), &["1", "2"]);
        assert_eq!(d.text_in(Range::ordered(pos(0, 1), end)), "1\n2");
    }

    // -- Word count ---------------------------------------------------------

    #[test]
    fn word_count_is_cached_and_invalidated() {
        let mut d = doc("Hello world this is\na test of word counting\n\nwith empty lines");
        assert!(!d.word_count_cached());
        assert_eq!(d.word_count(), 12);
        assert!(d.word_count_cached());
        d.insert_text(pos(2, 0), "more");
        assert!(!d.word_count_cached());
        assert_eq!(d.word_count(), 13);
    }
}
