// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell holds a codepoint, a foreground and background color, and a
// small attribute set. The editor paints a grid of these into a
// FrameBuffer; the renderer diffs grids and emits ANSI for the changes.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the codepoint; the second is a continuation cell (ch = 0) that
// carries the same colors so backgrounds fill both columns.

// ─── Color ──────────────────────────────────────────────────────────────────

/// A terminal color as the renderer emits it.
///
/// The named variants map to the 16-color ANSI palette, which every
/// terminal honors and which respects the user's theme. `Indexed` and
/// `Rgb` are available for anything more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// The terminal's own default foreground or background.
    #[default]
    Default,
    Black,
    White,
    Yellow,
    Blue,
    /// Bright black — the status bar background.
    Gray,
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// The 256-color palette index for the named variants.
    #[must_use]
    pub const fn palette_index(self) -> Option<u8> {
        match self {
            Self::Black => Some(0),
            Self::Yellow => Some(3),
            Self::Blue => Some(4),
            Self::White => Some(7),
            Self::Gray => Some(8),
            Self::Indexed(i) => Some(i),
            Self::Default | Self::Rgb(..) => None,
        }
    }
}

// ─── Text Attributes ────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 4.
        const UNDERLINE = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 3;
    }
}

// ─── Style ──────────────────────────────────────────────────────────────────

/// Foreground, background, and attributes applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    /// A style with the given colors and no attributes.
    #[inline]
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    /// Replace the attribute set.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }
}

// ─── Cell ───────────────────────────────────────────────────────────────────

/// Continuation marker for the second column of a wide character.
const CONTINUATION: u32 = 0;

/// Codepoint of an empty cell.
const SPACE: u32 = b' ' as u32;

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Unicode codepoint. `0` marks a continuation cell.
    pub ch: u32,
    pub style: Style,
}

impl Cell {
    /// Space with default styling.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        style: Style::PLAIN,
    };

    /// A character with default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            style: Style::PLAIN,
        }
    }

    /// A character with an explicit style.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self {
            ch: ch as u32,
            style,
        }
    }

    /// The second column of a wide character, carrying its owner's style.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            ch: CONTINUATION,
            style,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The codepoint as a `char`; `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_plain_space() {
        assert_eq!(Cell::EMPTY.character(), Some(' '));
        assert_eq!(Cell::EMPTY.style, Style::PLAIN);
        assert_eq!(Cell::default(), Cell::EMPTY);
    }

    #[test]
    fn continuation_has_no_character() {
        let style = Style::new(Color::White, Color::Blue);
        let cell = Cell::continuation(style);
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
        assert_eq!(cell.style, style);
    }

    #[test]
    fn styled_keeps_codepoint() {
        let cell = Cell::styled('世', Style::new(Color::Black, Color::Yellow));
        assert_eq!(cell.character(), Some('世'));
        assert!(!cell.is_continuation());
    }

    #[test]
    fn palette_indices() {
        assert_eq!(Color::Yellow.palette_index(), Some(3));
        assert_eq!(Color::Gray.palette_index(), Some(8));
        assert_eq!(Color::Indexed(200).palette_index(), Some(200));
        assert_eq!(Color::Default.palette_index(), None);
        assert_eq!(Color::Rgb(1, 2, 3).palette_index(), None);
    }

    #[test]
    fn with_attrs_replaces() {
        let s = Style::PLAIN.with_attrs(Attr::BOLD | Attr::INVERSE);
        assert!(s.attrs.contains(Attr::BOLD));
        assert!(s.attrs.contains(Attr::INVERSE));
        assert_eq!(s.fg, Color::Default);
    }
}
