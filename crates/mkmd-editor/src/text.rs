//! Rune-indexed string primitives.
//!
//! Lines are stored as `String` (UTF-8) but every column in the editor is a
//! rune offset: the count of Unicode scalar values before it. These helpers
//! do the byte/rune conversion in one place. All of them clamp out-of-range
//! arguments instead of panicking: a start past the end clamps to the end,
//! and an inverted range is treated as empty.
//!
//! Display widths follow East Asian Width via `unicode-width`: CJK and most
//! emoji take two terminal columns, combining marks and control characters
//! take none. Tabs are the exception: they occupy a single blank column.

use unicode_width::UnicodeWidthChar;

// ---------------------------------------------------------------------------
// Rune offsets
// ---------------------------------------------------------------------------

/// Number of runes in `s`.
#[inline]
#[must_use]
pub fn rune_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of rune `col`, clamped to `s.len()`.
#[must_use]
pub fn byte_offset(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

/// The runes in `[start, end)`.
#[must_use]
pub fn substring(s: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    let from = byte_offset(s, start);
    let to = from + byte_offset(&s[from..], end - start);
    &s[from..to]
}

/// `s` with `text` inserted before rune `pos`.
#[must_use]
pub fn insert(s: &str, pos: usize, text: &str) -> String {
    let at = byte_offset(s, pos);
    let mut out = String::with_capacity(s.len() + text.len());
    out.push_str(&s[..at]);
    out.push_str(text);
    out.push_str(&s[at..]);
    out
}

/// `s` without the runes in `[start, end)`. An empty or inverted range
/// returns `s` unchanged.
#[must_use]
pub fn delete(s: &str, start: usize, end: usize) -> String {
    if end <= start {
        return s.to_owned();
    }
    let from = byte_offset(s, start);
    let to = from + byte_offset(&s[from..], end - start);
    let mut out = String::with_capacity(s.len() - (to - from));
    out.push_str(&s[..from]);
    out.push_str(&s[to..]);
    out
}

/// Split at rune `col` into `(head, tail)`.
#[must_use]
pub fn split_at(s: &str, col: usize) -> (&str, &str) {
    s.split_at(byte_offset(s, col))
}

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

/// Letters, digits, and underscore.
#[inline]
#[must_use]
pub fn is_word_rune(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// The leading run of spaces and tabs.
#[must_use]
pub fn leading_indent(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|&(_, c)| c != ' ' && c != '\t')
        .map_or(s.len(), |(i, _)| i);
    &s[..end]
}

// ---------------------------------------------------------------------------
// Display width
// ---------------------------------------------------------------------------

/// Terminal columns taken by `ch`: 0, 1 or 2. A tab is drawn as one blank.
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    if ch == '\t' {
        return 1;
    }
    ch.width().unwrap_or(0)
}

#[must_use]
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Display column of rune `col`, i.e. the width of the runes before it.
#[must_use]
pub fn display_col(s: &str, col: usize) -> usize {
    s.chars().take(col).map(char_width).sum()
}

// ---------------------------------------------------------------------------
// RuneIndex
// ---------------------------------------------------------------------------

/// A line decoded into runes, lowercased one rune at a time.
///
/// Folding maps each rune to the first rune of its lowercase form, so
/// positions in the index are positions in the original line. This is what
/// the search engine runs on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuneIndex {
    runes: Vec<char>,
}

impl RuneIndex {
    #[must_use]
    pub fn folded(s: &str) -> Self {
        Self {
            runes: s.chars().map(fold).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.runes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<char> {
        self.runes.get(i).copied()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[char] {
        &self.runes
    }

    /// First occurrence of `needle` starting at or after rune `from`.
    #[must_use]
    pub fn find_from(&self, needle: &[char], from: usize) -> Option<usize> {
        if needle.is_empty() || from >= self.runes.len() {
            return None;
        }
        self.runes[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| i + from)
    }

    /// Last occurrence of `needle` lying entirely before rune `end`.
    #[must_use]
    pub fn rfind_before(&self, needle: &[char], end: usize) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        let end = end.min(self.runes.len());
        self.runes[..end].windows(needle.len()).rposition(|w| w == needle)
    }
}

/// Fold a needle the same way [`RuneIndex::folded`] folds a line.
#[must_use]
pub fn fold_term(term: &str) -> Vec<char> {
    term.chars().map(fold).collect()
}

#[inline]
fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -- Offsets ------------------------------------------------------------

    #[test]
    fn rune_len_counts_scalars() {
        assert_eq!(rune_len(""), 0);
        assert_eq!(rune_len("héllo"), 5);
        assert_eq!(rune_len("世界"), 2);
    }

    #[test]
    fn byte_offset_clamps() {
        assert_eq!(byte_offset("a世b", 0), 0);
        assert_eq!(byte_offset("a世b", 2), 4);
        assert_eq!(byte_offset("a世b", 99), 5);
    }

    #[test]
    fn substring_clamps_and_handles_inverted() {
        assert_eq!(substring("héllo", 1, 3), "él");
        assert_eq!(substring("héllo", 3, 99), "lo");
        assert_eq!(substring("héllo", 9, 12), "");
        assert_eq!(substring("héllo", 3, 1), "");
    }

    #[test]
    fn insert_clamps_position() {
        assert_eq!(insert("世界", 1, "x"), "世x界");
        assert_eq!(insert("ab", 10, "c"), "abc");
        assert_eq!(insert("", 0, "z"), "z");
    }

    #[test]
    fn delete_inverted_range_is_identity() {
        assert_eq!(delete("hello", 3, 1), "hello");
        assert_eq!(delete("hello", 2, 2), "hello");
        assert_eq!(delete("héllo", 1, 2), "hllo");
        assert_eq!(delete("hello", 3, 50), "hel");
    }

    // -- Classes ------------------------------------------------------------

    #[test]
    fn word_runes() {
        assert!(is_word_rune('a'));
        assert!(is_word_rune('É'));
        assert!(is_word_rune('7'));
        assert!(is_word_rune('_'));
        assert!(is_word_rune('世'));
        assert!(!is_word_rune(' '));
        assert!(!is_word_rune('-'));
    }

    #[test]
    fn leading_indent_stops_at_text() {
        assert_eq!(leading_indent("  \tfoo  "), "  \t");
        assert_eq!(leading_indent("foo"), "");
        assert_eq!(leading_indent("   "), "   ");
    }

    // -- Width --------------------------------------------------------------

    #[test]
    fn widths() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('世'), 2);
        assert_eq!(char_width('\u{0301}'), 0);
        assert_eq!(char_width('\t'), 1);
        assert_eq!(display_width("a世b"), 4);
        assert_eq!(display_col("a世b", 2), 3);
    }

    // -- RuneIndex ----------------------------------------------------------

    #[test]
    fn folded_index_keeps_positions() {
        let idx = RuneIndex::folded("Ärger HELLO");
        assert_eq!(idx.len(), 11);
        assert_eq!(idx.get(0), Some('ä'));
        assert_eq!(idx.find_from(&fold_term("hello"), 0), Some(6));
    }

    #[test]
    fn find_from_respects_start() {
        let idx = RuneIndex::folded("abcabc");
        let needle = fold_term("abc");
        assert_eq!(idx.find_from(&needle, 0), Some(0));
        assert_eq!(idx.find_from(&needle, 1), Some(3));
        assert_eq!(idx.find_from(&needle, 4), None);
        assert_eq!(idx.find_from(&needle, 99), None);
    }

    #[test]
    fn rfind_before_requires_whole_match() {
        let idx = RuneIndex::folded("abcabc");
        let needle = fold_term("abc");
        assert_eq!(idx.rfind_before(&needle, 6), Some(3));
        assert_eq!(idx.rfind_before(&needle, 5), Some(0));
        assert_eq!(idx.rfind_before(&needle, 2), None);
    }

    #[test]
    fn empty_needle_never_matches() {
        let idx = RuneIndex::folded("abc");
        assert_eq!(idx.find_from(&[], 0), None);
        assert_eq!(idx.rfind_before(&[], 3), None);
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn delete_undoes_insert(s in "\\PC{0,16}", t in "\\PC{0,8}", pos in 0usize..20) {
            let pos = pos.min(rune_len(&s));
            let inserted = insert(&s, pos, &t);
            prop_assert_eq!(delete(&inserted, pos, pos + rune_len(&t)), s);
        }

        #[test]
        fn substring_never_exceeds_source(s in "\\PC{0,16}", a in 0usize..24, b in 0usize..24) {
            let sub = substring(&s, a, b);
            prop_assert!(rune_len(sub) <= rune_len(&s));
            prop_assert!(s.contains(sub));
        }

        #[test]
        fn delete_length_is_clamped(s in "\\PC{0,16}", a in 0usize..24, b in 0usize..24) {
            let n = rune_len(&s);
            let removed = b.min(n).saturating_sub(a.min(n));
            prop_assert_eq!(rune_len(&delete(&s, a, b)), n - removed);
        }
    }
}
