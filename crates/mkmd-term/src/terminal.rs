// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and RAII cleanup.
//
// Entering the editor switches stdin to raw mode via termios, moves to the
// alternate screen, and turns on SGR mouse reporting and bracketed paste.
// Leaving undoes all of it in reverse. `Drop` leaves automatically.
//
// A panic while in raw mode would strand the user's shell without echo.
// The panic hook writes a fixed restore sequence straight to fd 1 (no
// stdout lock, which a mid-frame panic may be holding), puts the saved
// termios back, then hands over to the previous hook.
//
// termios, ioctl and isatty have no safe wrappers in std.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::Once;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the real size cannot be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Current window size of stdout, if it is a terminal.
#[must_use]
pub fn get_size() -> Option<Size> {
    sys::window_size()
}

// ─── Platform ───────────────────────────────────────────────────────────────

#[cfg(unix)]
mod sys {
    use std::io;
    use std::sync::Mutex;

    use super::Size;

    /// Saved cooked-mode settings. Global so the panic hook can reach them.
    static SAVED: Mutex<Option<libc::termios>> = Mutex::new(None);

    pub fn window_size() -> Option<Size> {
        // SAFETY: winsize is plain data and TIOCGWINSZ only writes into it.
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
        if rc != 0 || ws.ws_col == 0 || ws.ws_row == 0 {
            return None;
        }
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }

    pub fn stdin_is_tty() -> bool {
        // SAFETY: isatty only inspects the descriptor.
        unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
    }

    /// Switch stdin to raw mode, remembering the previous settings.
    /// Nothing happens when stdin is not a terminal.
    pub fn make_raw() -> io::Result<()> {
        if !stdin_is_tty() {
            return Ok(());
        }
        // SAFETY: termios is plain data, filled by tcgetattr before use.
        let mut tio: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut tio) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let saved = tio;

        // SAFETY: cfmakeraw rewrites the flags of a valid termios.
        unsafe { libc::cfmakeraw(&raw mut tio) };
        tio.c_cc[libc::VMIN] = 1;
        tio.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const tio) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut slot) = SAVED.lock() {
            *slot = Some(saved);
        }
        Ok(())
    }

    /// Put back the settings saved by [`make_raw`].
    pub fn restore() -> io::Result<()> {
        let Some(saved) = SAVED.lock().ok().and_then(|mut slot| slot.take()) else {
            return Ok(());
        };
        // SAFETY: `saved` came from tcgetattr.
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const saved) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Panic-path restore: no allocation, no stdout lock.
    pub fn emergency(bytes: &[u8]) {
        // SAFETY: writes a static buffer to fd 1.
        unsafe {
            let _ = libc::write(libc::STDOUT_FILENO, bytes.as_ptr().cast(), bytes.len());
        }
        if let Ok(slot) = SAVED.lock() {
            if let Some(saved) = slot.as_ref() {
                // SAFETY: `saved` came from tcgetattr.
                unsafe {
                    let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, saved);
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io::{self, Write};

    use super::Size;

    pub const fn window_size() -> Option<Size> {
        None
    }

    pub const fn make_raw() -> io::Result<()> {
        Ok(())
    }

    pub const fn restore() -> io::Result<()> {
        Ok(())
    }

    pub fn emergency(bytes: &[u8]) {
        let mut out = io::stdout();
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }
}

// ─── Panic Restore ──────────────────────────────────────────────────────────

/// End sync, mouse off, paste off, SGR reset, cursor on, main screen.
/// The alternate screen exit must come last.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1002l\x1b[?1000l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            sys::emergency(EMERGENCY_RESTORE);
            previous(info);
        }));
    });
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owns the terminal's editor mode. Restored on drop.
///
/// ```no_run
/// use mkmd_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // draw frames, read input
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Terminal {
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle sized to the current terminal, or 80x24 when unknown.
    /// Does not touch terminal modes until [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size, e.g. after SIGWINCH. Keeps the last known size
    /// when the query fails.
    pub fn refresh_size(&mut self) -> Size {
        self.size = get_size().unwrap_or(self.size);
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, mouse and paste reporting.
    /// A second call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or stdout fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        sys::make_raw()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::enable_mouse(&mut out)?;
        ansi::enable_bracketed_paste(&mut out)?;
        out.flush()?;

        self.active = true;
        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal entered");
        Ok(())
    }

    /// Undo [`enter`](Self::enter). A no-op when inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout or termios fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        {
            let mut out = io::stdout().lock();
            ansi::end_sync(&mut out)?;
            ansi::disable_bracketed_paste(&mut out)?;
            ansi::disable_mouse(&mut out)?;
            ansi::reset(&mut out)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            out.flush()?;
        }
        sys::restore()?;
        self.active = false;
        tracing::debug!("terminal left");
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handle_is_inactive() {
        let term = Terminal::new();
        assert!(!term.is_active());
        assert!(term.size().cols > 0 && term.size().rows > 0);
    }

    #[test]
    fn leaving_an_inactive_terminal_does_nothing() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn refresh_returns_the_cached_size() {
        let mut term = Terminal::new();
        let s = term.refresh_size();
        assert_eq!(s, term.size());
    }

    #[test]
    fn restore_without_saved_settings_is_ok() {
        sys::restore().unwrap();
    }

    #[test]
    fn emergency_sequence_leaves_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
        for part in ["\x1b[?1000l", "\x1b[?2004l", "\x1b[?25h", "\x1b[0m"] {
            assert!(s.contains(part), "missing {part:?}");
        }
    }
}
