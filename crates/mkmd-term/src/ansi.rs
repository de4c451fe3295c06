// SPDX-License-Identifier: MIT
//
// ANSI escape sequence encoding.
//
// Stateless writers over any `impl Write`. Deciding *when* to emit is the
// renderer's job; this module only knows the bytes. Coordinates are
// 0-indexed here and converted to the terminal's 1-indexed form.

use std::io::{self, Write};

use crate::cell::{Attr, Color};

// ─── Cursor ─────────────────────────────────────────────────────────────────

/// CUP — move the cursor to `(x, y)`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// ED 2 — clear the whole screen.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// SGR 0 — reset colors and attributes.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Begin synchronized output (DEC 2026).
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Colors ─────────────────────────────────────────────────────────────────

/// Set the foreground color.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
        named => match named.palette_index() {
            Some(idx @ 0..=7) => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
            Some(idx @ 8..=15) => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
            Some(idx) => write!(w, "\x1b[38;5;{idx}m"),
            None => w.write_all(b"\x1b[39m"),
        },
    }
}

/// Set the background color.
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
        named => match named.palette_index() {
            Some(idx @ 0..=7) => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
            Some(idx @ 8..=15) => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
            Some(idx) => write!(w, "\x1b[48;5;{idx}m"),
            None => w.write_all(b"\x1b[49m"),
        },
    }
}

/// Emit all set attributes as one SGR sequence. Nothing for an empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    let codes: Vec<&str> = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::UNDERLINE, "4"),
        (Attr::INVERSE, "7"),
    ]
    .into_iter()
    .filter(|(flag, _)| attr.contains(*flag))
    .map(|(_, code)| code)
    .collect();

    if codes.is_empty() {
        return Ok(());
    }
    write!(w, "\x1b[{}m", codes.join(";"))
}

// ─── Input Modes ────────────────────────────────────────────────────────────

/// Enable click + drag mouse tracking in SGR encoding (DEC 1000/1002/1006).
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1002h\x1b[?1006h")
}

pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1002l\x1b[?1000l")
}

/// Bracketed paste (DEC 2004).
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cursor_to_is_one_indexed() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn named_colors_use_compact_codes() {
        assert_eq!(emit(|w| fg(w, Color::Black)), "\x1b[30m");
        assert_eq!(emit(|w| bg(w, Color::Yellow)), "\x1b[43m");
        assert_eq!(emit(|w| bg(w, Color::Gray)), "\x1b[100m");
        assert_eq!(emit(|w| fg(w, Color::Gray)), "\x1b[90m");
    }

    #[test]
    fn extended_colors() {
        assert_eq!(emit(|w| fg(w, Color::Indexed(200))), "\x1b[38;5;200m");
        assert_eq!(emit(|w| bg(w, Color::Rgb(1, 2, 3))), "\x1b[48;2;1;2;3m");
        assert_eq!(emit(|w| fg(w, Color::Default)), "\x1b[39m");
    }

    #[test]
    fn attrs_joined() {
        assert_eq!(emit(|w| attrs(w, Attr::BOLD | Attr::INVERSE)), "\x1b[1;7m");
        assert_eq!(emit(|w| attrs(w, Attr::empty())), "");
    }
}
