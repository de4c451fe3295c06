//! Frame rendering: a [`Session`] painted into a [`FrameBuffer`].
//!
//! ```text
//! row 0 .. text_rows    document lines from offset_y, clipped at offset_x
//! last row              status line, or a prompt / message overlay
//! ```
//!
//! Search matches are black on yellow. The selection is white on blue and
//! wins over a search match on the same rune.

use mkmd_term::buffer::FrameBuffer;
use mkmd_term::cell::{Cell, Color, Style};

use crate::search::{self, Match};
use crate::session::Session;
use crate::viewport::Viewport;

pub const SEARCH_STYLE: Style = Style::new(Color::Black, Color::Yellow);
pub const SELECTION_STYLE: Style = Style::new(Color::White, Color::Blue);
pub const STATUS_STYLE: Style = Style::new(Color::White, Color::Gray);
pub const PROMPT_STYLE: Style = Style::new(Color::White, Color::Blue);

/// What the bottom row shows instead of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay<'a> {
    /// Text being typed; the cursor sits at its end.
    Prompt(&'a str),
    /// A one-off message such as an error.
    Message(&'a str),
}

/// Paint `session` into `frame`. Returns the terminal cursor cell, or
/// `None` when the cursor should be hidden.
pub fn render(
    session: &Session,
    frame: &mut FrameBuffer,
    overlay: Option<Overlay<'_>>,
) -> Option<(u16, u16)> {
    let height = frame.height();
    if frame.width() == 0 || height == 0 {
        return None;
    }
    let status_y = height - 1;
    let doc = session.document();
    let vp = session.viewport();
    let selection = session.selection();
    let term = session.search_term().unwrap_or("");

    for y in 0..status_y {
        let line_idx = vp.offset_y() + usize::from(y);
        if line_idx >= doc.line_count() {
            frame.fill_row_from(0, y, Style::PLAIN);
            continue;
        }
        let line = doc.line(line_idx);
        let matches = search::find_in_line(line, term);
        let selected = selection.and_then(|r| r.cols_on_line(line_idx, doc.line_len(line_idx)));
        paint_line(frame, y, line, vp, &matches, selected);
    }

    frame.fill_row_from(0, status_y, STATUS_STYLE);
    match overlay {
        Some(Overlay::Prompt(text)) => {
            let end = frame.put_str(0, status_y, text, PROMPT_STYLE);
            (end < frame.width()).then_some((end, status_y))
        }
        Some(Overlay::Message(text)) => {
            frame.put_str(0, status_y, text, STATUS_STYLE);
            text_cursor(session, status_y)
        }
        None => {
            frame.put_str(0, status_y, &session.status_line(), STATUS_STYLE);
            text_cursor(session, status_y)
        }
    }
}

fn text_cursor(session: &Session, status_y: u16) -> Option<(u16, u16)> {
    let (x, y) = session.cursor_cell()?;
    let x = u16::try_from(x).ok()?;
    let y = u16::try_from(y).ok()?;
    (y < status_y).then_some((x, y))
}

/// Paint one document line into row `y`, starting at the viewport's
/// horizontal offset.
fn paint_line(
    frame: &mut FrameBuffer,
    y: u16,
    line: &str,
    vp: &Viewport,
    matches: &[Match],
    selected: Option<(usize, usize)>,
) {
    let style_at = |col: usize| {
        if selected.is_some_and(|(from, to)| col >= from && col < to) {
            SELECTION_STYLE
        } else if matches.iter().any(|m| col >= m.start && col < m.end()) {
            SEARCH_STYLE
        } else {
            Style::PLAIN
        }
    };

    let width = frame.width();
    let (start, blanks) = vp.visible_start(line);
    let mut x: u16 = 0;

    // Visible half of a wide glyph cut by the left edge.
    let blank_style = start.checked_sub(1).map_or(Style::PLAIN, style_at);
    for _ in 0..blanks {
        if x >= width {
            break;
        }
        frame.set(x, y, Cell::styled(' ', blank_style));
        x += 1;
    }

    for (col, ch) in line.chars().enumerate().skip(start) {
        if x >= width {
            break;
        }
        let ch = if ch == '\t' { ' ' } else { ch };
        x += frame.put_char(x, y, ch, style_at(col));
    }
    frame.fill_row_from(x, y, Style::PLAIN);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
