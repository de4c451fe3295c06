// SPDX-License-Identifier: MIT
//
// FrameBuffer — a 2D grid of cells.
//
// The editor paints one of these per frame and hands it to the renderer.
// Writes are bounds-checked; anything off-grid is dropped silently, so
// painting code can be written without clipping arithmetic at each step.
//
// Wide characters are written as a lead cell plus a continuation cell.
// Overwriting either half of an existing wide character breaks the pair
// so no orphaned half is ever emitted to the terminal.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};

/// A grid of [`Cell`]s addressed by `(x, y)`, row-major.
///
/// ```
/// use mkmd_term::buffer::FrameBuffer;
/// use mkmd_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(10, 2);
/// buf.set(3, 1, Cell::new('x'));
/// assert_eq!(buf.get(3, 1).and_then(|c| c.character()), Some('x'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// The cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells.get(self.index(x, y))
    }

    /// A full row as a slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        self.cells.get(start..start + usize::from(self.width))
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Change dimensions. Contents are discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy another buffer of the same size into this one.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }

    /// Write a raw cell. Returns `false` when out of bounds.
    ///
    /// Any wide character touching `(x, y)` is broken first.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Break any wide character whose lead or continuation is at `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = u32::from(b' ');
        }
        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    /// Paint one character at `(x, y)` and return the columns consumed.
    ///
    /// Wide characters take two columns; if only one column is left in
    /// the row, a blank is painted instead. Zero-width characters are
    /// skipped and consume nothing.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) -> u16 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        match ch.width().unwrap_or(0) {
            0 => 0,
            2 if x + 1 >= self.width => {
                self.set(x, y, Cell::styled(' ', style));
                1
            }
            2 => {
                self.set(x, y, Cell::styled(ch, style));
                self.set(x + 1, y, Cell::continuation(style));
                // An old continuation at x+1 blanks the lead we just wrote.
                let idx = self.index(x, y);
                self.cells[idx] = Cell::styled(ch, style);
                2
            }
            _ => {
                self.set(x, y, Cell::styled(ch, style));
                1
            }
        }
    }

    /// Paint a string starting at `(x, y)`, clipped to the row.
    ///
    /// Returns the column just past the last painted cell.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            col += self.put_char(col, y, ch, style);
        }
        col
    }

    /// Fill `[x, width)` of row `y` with blanks in `style`.
    pub fn fill_row_from(&mut self, x: u16, y: u16, style: Style) {
        for col in x..self.width {
            self.set(col, y, Cell::styled(' ', style));
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
