// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Compares each new frame against the previous one and emits ANSI only
// for cells that changed. Unchanged rows are skipped with one slice
// comparison. Output is accumulated in a byte buffer and written with a
// single syscall, wrapped in synchronized-output markers to prevent
// tearing.
//
// Within a frame the renderer tracks the terminal's cursor and SGR state
// so sequential cells skip the cursor move, and runs of equal style skip
// the color codes.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Cell, Style};

// ─── Cell Writer ────────────────────────────────────────────────────────────

/// Tracks what the terminal currently has so redundant escapes are skipped.
#[derive(Debug, Default)]
struct CellWriter {
    /// Column after the last emitted cell, when known.
    last: Option<(u16, u16)>,
    style: Option<Style>,
}

impl CellWriter {
    fn render_cell(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: Cell) {
        // The terminal already drew the continuation with its lead.
        if cell.is_continuation() && self.last == Some((x, y)) {
            self.last = Some((x + 1, y));
            return;
        }

        if self.last != Some((x, y)) {
            ansi::cursor_to(out, x, y).ok();
        }

        self.apply_style(out, cell.style);

        match cell.character() {
            Some(ch) => {
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            None => out.push(b' '),
        }

        self.last = Some((x + 1, y));
    }

    fn apply_style(&mut self, out: &mut Vec<u8>, style: Style) {
        let prev = self.style;
        if prev == Some(style) {
            return;
        }

        // Attributes can only be cleared with a full reset.
        let attrs_changed = prev.is_none_or(|p| p.attrs != style.attrs);
        if attrs_changed {
            ansi::reset(out).ok();
            ansi::attrs(out, style.attrs).ok();
        }
        if attrs_changed || prev.is_none_or(|p| p.fg != style.fg) {
            ansi::fg(out, style.fg).ok();
        }
        if attrs_changed || prev.is_none_or(|p| p.bg != style.bg) {
            ansi::bg(out, style.bg).ok();
        }
        self.style = Some(style);
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────────

/// Per-frame statistics, mostly for tests and trace logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
}

/// Differential frame renderer.
#[derive(Debug, Default)]
pub struct Renderer {
    output: Vec<u8>,
    previous: Option<FrameBuffer>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the previous frame and buffer the ANSI output.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        let mut writer = CellWriter::default();
        let mut stats = RenderStats::default();

        let (width, height) = (current.width(), current.height());
        if width == 0 || height == 0 {
            self.previous = Some(current.clone());
            return stats;
        }

        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == width && p.height() == height);

        ansi::begin_sync(&mut self.output).ok();
        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let prev_row = previous.as_ref().and_then(|p| p.row(y));
            let Some(row) = current.row(y) else { continue };
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row.iter()) {
                let unchanged = prev_row.and_then(|r| r.get(usize::from(x))) == Some(cell);
                // A changed lead forces its continuation out too.
                let lead_changed = cell.is_continuation() && writer.last == Some((x, y));
                if unchanged && !lead_changed {
                    stats.cells_skipped += 1;
                } else {
                    writer.render_cell(&mut self.output, x, y, *cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        if writer.style.is_some() {
            ansi::reset(&mut self.output).ok();
        }
        ansi::end_sync(&mut self.output).ok();

        match previous {
            Some(mut prev) => {
                prev.copy_from(current);
                self.previous = Some(prev);
            }
            None => self.previous = Some(current.clone()),
        }
        stats
    }

    /// The bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write buffered output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.output)?;
        w.flush()?;
        self.output.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Color;

    fn output(r: &Renderer) -> String {
        String::from_utf8_lossy(r.output_bytes()).into_owned()
    }

    #[test]
    fn first_frame_renders_everything() {
        let mut r = Renderer::new();
        let mut frame = FrameBuffer::new(3, 2);
        frame.put_str(0, 0, "abc", Style::PLAIN);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 6);
        assert!(output(&r).contains("abc"));
        assert!(output(&r).contains("\x1b[2J"));
    }

    #[test]
    fn unchanged_frame_skips_all_cells() {
        let mut r = Renderer::new();
        let frame = FrameBuffer::new(4, 2);
        r.render(&frame);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 8);
    }

    #[test]
    fn only_changed_cells_are_emitted() {
        let mut r = Renderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        r.render(&frame);
        frame.put_char(2, 0, 'z', Style::PLAIN);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 1);
        let out = output(&r);
        assert!(out.contains("\x1b[1;3H"), "{out:?}");
        assert!(out.contains('z'));
        assert!(!out.contains("\x1b[1;1H"));
    }

    #[test]
    fn continuation_is_not_emitted_after_lead() {
        let mut r = Renderer::new();
        let mut frame = FrameBuffer::new(3, 1);
        frame.put_char(0, 0, '世', Style::PLAIN);
        r.render(&frame);
        let out = output(&r);
        // '世' then 1 blank for column 2, never a blank between.
        assert!(out.contains("世 "), "{out:?}");
        assert!(!out.contains("世  "), "{out:?}");
    }

    #[test]
    fn style_runs_share_escape_codes() {
        let mut r = Renderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        let style = Style::new(Color::Black, Color::Yellow);
        frame.put_str(0, 0, "abcd", style);
        r.render(&frame);
        assert_eq!(output(&r).matches("\x1b[43m").count(), 1);
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = Renderer::new();
        r.render(&FrameBuffer::new(2, 1));
        let stats = r.render(&FrameBuffer::new(3, 1));
        assert_eq!(stats.cells_rendered, 3);
    }

    #[test]
    fn flush_clears_output() {
        let mut r = Renderer::new();
        r.render(&FrameBuffer::new(1, 1));
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output_bytes().is_empty());
    }
}
