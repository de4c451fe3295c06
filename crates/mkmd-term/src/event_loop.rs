// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin bytes in, frames out.
//
// The loop blocks on the reader channel with a tick-length timeout. Input
// is handled the moment it arrives; when nothing arrives, the timeout
// gives the application a tick (scroll momentum runs on ticks) and flushes
// a pending lone ESC as the Escape key. A frame is painted only when an
// event, a resize, or a tick reported a change.
//
// Resize is detected by a SIGWINCH handler that sets an atomic flag,
// checked once per iteration.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::render::Renderer;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ──────────────────────────────────────────────────────────────

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// The application driven by [`EventLoop`].
///
/// Per iteration the loop calls [`on_event`](App::on_event) for each
/// decoded event, [`on_resize`](App::on_resize) after SIGWINCH,
/// [`on_tick`](App::on_tick), and then [`paint`](App::paint) and
/// [`cursor`](App::cursor) if anything changed.
pub trait App {
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The frame buffer has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Return `true` when time-based state changed and a repaint is due.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Paint into a freshly cleared buffer.
    fn paint(&mut self, buf: &mut FrameBuffer);

    /// Where to show the hardware cursor, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── Config ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Channel timeout, doubling as the tick period and the escape timeout.
    pub tick_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_micros(16_667),
        }
    }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer for one run.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: Renderer::new(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until the app quits, then restore it.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, rendering or restore fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();
        app.on_resize(self.terminal.size());

        let (mut reader, rx) = StdinReader::spawn();
        let result = self.run_inner(app, &rx);

        reader.stop();
        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(self.config.tick_interval) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("stdin closed");
                    return Ok(());
                }
            };
            for event in &events {
                if app.on_event(event) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !events.is_empty();

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                tracing::debug!(cols = new_size.cols, rows = new_size.rows, "resize");
                frame.resize(new_size.cols, new_size.rows);
                self.renderer.force_redraw();
                app.on_resize(new_size);
                dirty = true;
            }

            dirty |= app.on_tick();

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                let stats = self.renderer.render(&frame);
                tracing::trace!(
                    rendered = stats.cells_rendered,
                    skipped = stats.cells_skipped,
                    "frame"
                );

                let stdout = io::stdout();
                let mut lock = stdout.lock();
                self.renderer.flush_to(&mut lock)?;
                match app.cursor() {
                    Some((x, y)) => {
                        ansi::cursor_to(&mut lock, x, y)?;
                        ansi::cursor_show(&mut lock)?;
                    }
                    None => ansi::cursor_hide(&mut lock)?,
                }
                lock.flush()?;
                dirty = false;
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent};

    struct MinimalApp;

    impl App for MinimalApp {
        fn paint(&mut self, _buf: &mut FrameBuffer) {}
    }

    #[test]
    fn default_tick_is_sixty_hertz() {
        assert_eq!(LoopConfig::default().tick_interval.as_micros(), 16_667);
    }

    #[test]
    fn app_defaults() {
        let mut app = MinimalApp;
        let event = Event::Key(KeyEvent::plain(KeyCode::Char('a')));
        assert_eq!(app.on_event(&event), Action::Continue);
        assert!(!app.on_tick());
        assert!(app.cursor().is_none());
        app.on_resize(Size { cols: 10, rows: 5 });
    }

    #[test]
    fn sigwinch_flag_swaps_back_to_false() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        assert!(SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed));
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }

    #[test]
    fn new_loop_has_a_size() {
        let event_loop = EventLoop::new();
        assert!(event_loop.size().cols > 0);
    }
}
