//! Case-insensitive search with wraparound.
//!
//! Matching runs on [`RuneIndex`] so every position is a rune column in the
//! original line. A term never matches across a line break.
//!
//! Forward search has three phases: the rest of the document after the
//! cursor, then the lines above it, then the cursor line before the cursor.
//! Backward search walks up from the cursor and then wraps from the bottom.

use crate::document::Document;
use crate::position::Position;
use crate::text::{RuneIndex, fold_term};

/// A match within one line, in runes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub len: usize,
}

impl Match {
    #[inline]
    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }
}

/// Next occurrence of `term` after `from`, wrapping around the document.
///
/// `None` for an empty term or no match.
#[must_use]
pub fn find_next(doc: &Document, term: &str, from: Position) -> Option<Position> {
    let needle = fold_term(term);
    if needle.is_empty() {
        return None;
    }

    // Rest of the cursor line, then every line below.
    for y in from.line..doc.line_count() {
        let idx = RuneIndex::folded(doc.line(y));
        let start = if y == from.line { from.col + 1 } else { 0 };
        if y == from.line && start >= idx.len() {
            continue;
        }
        if let Some(col) = idx.find_from(&needle, start) {
            return Some(Position::new(y, col));
        }
    }

    // Lines above the cursor.
    for y in 0..from.line.min(doc.line_count()) {
        if let Some(col) = RuneIndex::folded(doc.line(y)).find_from(&needle, 0) {
            return Some(Position::new(y, col));
        }
    }

    // The cursor line up to the cursor.
    let idx = RuneIndex::folded(doc.line(from.line));
    if from.col == 0 || from.col > idx.len() {
        return None;
    }
    idx.find_from(&needle, 0)
        .filter(|&col| col + needle.len() <= from.col)
        .map(|col| Position::new(from.line, col))
}

/// Previous occurrence of `term` before `from`, wrapping to the bottom.
#[must_use]
pub fn find_prev(doc: &Document, term: &str, from: Position) -> Option<Position> {
    let needle = fold_term(term);
    if needle.is_empty() {
        return None;
    }
    let last = doc.line_count().checked_sub(1)?;
    let from_line = from.line.min(last);

    for y in (0..=from_line).rev() {
        let idx = RuneIndex::folded(doc.line(y));
        let end = if y == from_line {
            if from.col == 0 {
                continue;
            }
            from.col.min(idx.len())
        } else {
            idx.len()
        };
        if let Some(col) = idx.rfind_before(&needle, end) {
            return Some(Position::new(y, col));
        }
    }

    for y in (from_line + 1..=last).rev() {
        let idx = RuneIndex::folded(doc.line(y));
        if let Some(col) = idx.rfind_before(&needle, idx.len()) {
            return Some(Position::new(y, col));
        }
    }
    None
}

/// First occurrence of `term` in the document, including (0, 0).
#[must_use]
pub fn find_first(doc: &Document, term: &str) -> Option<Position> {
    let needle = fold_term(term);
    if needle.is_empty() {
        return None;
    }
    doc.lines().iter().enumerate().find_map(|(y, line)| {
        RuneIndex::folded(line)
            .find_from(&needle, 0)
            .map(|col| Position::new(y, col))
    })
}

/// Every non-overlapping match of `term` in `line`, left to right.
#[must_use]
pub fn find_in_line(line: &str, term: &str) -> Vec<Match> {
    let needle = fold_term(term);
    let mut out = Vec::new();
    if needle.is_empty() {
        return out;
    }
    let idx = RuneIndex::folded(line);
    let mut from = 0;
    while let Some(start) = idx.find_from(&needle, from) {
        out.push(Match {
            start,
            len: needle.len(),
        });
        from = start + needle.len();
    }
    out
}

// ---------------------------------------------------------------------------
// Incremental search
// ---------------------------------------------------------------------------

/// The term being typed at the incremental search prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncrementalSearch {
    term: String,
}

impl IncrementalSearch {
    /// Start from `seed`, usually the last search term.
    #[must_use]
    pub fn begin(seed: &str) -> Self {
        Self {
            term: seed.to_owned(),
        }
    }

    #[inline]
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Append `ch`. Returns whether the term changed.
    pub fn push(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.term.push(ch);
        true
    }

    /// Drop the last rune. Returns whether the term changed.
    pub fn pop(&mut self) -> bool {
        self.term.pop().is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
