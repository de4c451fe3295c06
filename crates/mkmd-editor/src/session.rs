//! Session: one open file and everything the user can do to it.
//!
//! The session owns the document, cursor, history, viewport and chunk
//! state, and is the only thing that mutates them. Every editing intent
//! follows the same order:
//!
//! 1. snapshot the lines onto the undo stack
//! 2. drop the search term and the cached word count
//! 3. mutate the document
//! 4. clamp the cursor, mark the buffer modified if anything changed
//! 5. scroll the cursor into view
//!
//! Prompts ("Save as", "Save changes?") are not the session's business. A
//! front end asks the user and then calls the matching method, e.g.
//! [`Session::load_next_chunk`] with `save_first` already decided.

use std::path::{Path, PathBuf};

use crate::chunk::{self, Chunks};
use crate::config::EditorConfig;
use crate::cursor::{Cursor, Motion};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::history::History;
use crate::position::{Position, Range};
use crate::search;
use crate::viewport::Viewport;

/// Direction of a mouse wheel or trackpad notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug)]
pub struct Session {
    doc: Document,
    cursor: Cursor,
    history: History,
    viewport: Viewport,
    chunks: Chunks,
    config: EditorConfig,
    path: Option<PathBuf>,
    modified: bool,
    search: Option<String>,
    clipboard: String,
}

impl Session {
    /// An unnamed, empty session.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let doc = Document::new();
        Self {
            history: History::new(doc.lines(), config.history_cap),
            doc,
            cursor: Cursor::new(),
            viewport: Viewport::new(&config),
            chunks: Chunks::new(&config),
            config,
            path: None,
            modified: false,
            search: None,
            clipboard: String::new(),
        }
    }

    /// Open the first chunk of `path`. A missing file starts empty and is
    /// created on the first save.
    ///
    /// # Errors
    ///
    /// Any read failure other than the file not existing.
    pub fn open(path: impl Into<PathBuf>, config: EditorConfig) -> Result<Self> {
        let path = path.into();
        let mut session = Self::new(config);
        let lines = session.chunks.load(&path)?;
        session.doc.replace_all(lines);
        session.history.reset(session.doc.lines());
        session.path = Some(path);
        Ok(session)
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn chunks(&self) -> &Chunks {
        &self.chunks
    }

    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// The active search term, if any.
    #[inline]
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// The selection as a normalized range.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.cursor.selection()
    }

    /// Whitespace-separated words in the loaded chunk. Cached.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.doc.word_count()
    }

    /// Screen cell of the cursor, `None` when scrolled out of view.
    #[must_use]
    pub fn cursor_cell(&self) -> Option<(usize, usize)> {
        self.viewport
            .screen_position(&self.doc, self.cursor.position())
    }

    // -- Edit plumbing ------------------------------------------------------

    fn begin_edit(&mut self) {
        self.history.push(self.doc.lines());
        self.search = None;
        self.doc.invalidate();
    }

    fn finish_edit(&mut self, changed: bool) {
        self.cursor.clamp(&self.doc);
        if changed {
            self.modified = true;
        }
        self.reveal_cursor();
    }

    fn reveal_cursor(&mut self) {
        self.viewport
            .ensure_cursor_visible(&self.doc, self.cursor.position());
    }

    fn place(&mut self, pos: Position) {
        self.cursor.set_position(&self.doc, pos);
    }

    // -- Editing ------------------------------------------------------------

    /// Type `ch` at the cursor. Control characters are ignored. A selection
    /// is dropped, not replaced.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.cursor.clear_anchor();
        self.begin_edit();
        let mut buf = [0u8; 4];
        let pos = self.doc.insert_text(self.cursor.position(), ch.encode_utf8(&mut buf));
        self.place(pos);
        self.finish_edit(true);
        true
    }

    /// Insert the configured number of spaces, one undo step each.
    pub fn insert_tab(&mut self) {
        for _ in 0..self.config.tab_spaces {
            self.insert_char(' ');
        }
    }

    /// Split the line at the cursor, carrying its indentation over.
    pub fn insert_newline(&mut self) {
        self.cursor.clear_anchor();
        self.begin_edit();
        let pos = self.doc.split_line(self.cursor.position());
        self.place(pos);
        self.finish_edit(true);
    }

    /// Delete the rune before the cursor, or join with the previous line at
    /// column 0. History is recorded even when nothing changes.
    pub fn backspace(&mut self) -> bool {
        self.cursor.clear_anchor();
        self.begin_edit();
        let pos = self.cursor.position();
        let changed = if pos.col > 0 {
            self.doc.delete_char(Position::new(pos.line, pos.col - 1));
            self.place(Position::new(pos.line, pos.col - 1));
            true
        } else if pos.line > 0 {
            let prev_len = self.doc.line_len(pos.line - 1);
            self.doc.join_with_next(pos.line - 1);
            self.place(Position::new(pos.line - 1, prev_len));
            true
        } else {
            false
        };
        self.finish_edit(changed);
        changed
    }

    /// Delete the rune under the cursor, or join the next line at end of
    /// line.
    pub fn delete_forward(&mut self) -> bool {
        self.cursor.clear_anchor();
        self.begin_edit();
        let pos = self.cursor.position();
        let changed = self.doc.delete_char(pos) || self.doc.join_with_next(pos.line);
        self.finish_edit(changed);
        changed
    }

    /// Remove the selected text. `false` without a selection.
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.cursor.selection() else {
            return false;
        };
        self.begin_edit();
        let pos = self.doc.delete_range(range);
        self.cursor.clear_anchor();
        self.place(pos);
        self.finish_edit(!range.is_empty());
        true
    }

    /// Copy the selection to the clipboard.
    pub fn copy(&mut self) -> bool {
        let Some(range) = self.cursor.selection() else {
            return false;
        };
        self.clipboard = self.doc.text_in(range);
        true
    }

    pub fn cut(&mut self) -> bool {
        self.copy() && self.delete_selection()
    }

    /// Insert the clipboard at the cursor.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() {
            return false;
        }
        let text = self.clipboard.clone();
        self.paste_text(&text)
    }

    /// Insert `text` at the cursor, replacing any selection. Line breaks
    /// split lines. One undo step covers the whole paste.
    pub fn paste_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.begin_edit();
        if let Some(range) = self.cursor.selection() {
            let start = self.doc.delete_range(range);
            self.cursor.clear_anchor();
            self.place(start);
        }
        let pieces: Vec<&str> = text.split('\n').collect();
        let pos = self.doc.insert_pieces(self.cursor.position(), &pieces);
        self.place(pos);
        self.finish_edit(true);
        true
    }

    pub fn select_all(&mut self) {
        self.cursor.select_all(&self.doc);
    }

    // -- Movement -----------------------------------------------------------

    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        self.cursor.apply(&self.doc, motion, extend);
        self.reveal_cursor();
    }

    /// Up one screen of text rows. Drops the selection.
    pub fn page_up(&mut self) {
        let rows = self.viewport.text_rows().max(1);
        self.move_cursor(Motion::PageUp(rows), false);
    }

    /// Down one screen of text rows. Drops the selection.
    pub fn page_down(&mut self) {
        let rows = self.viewport.text_rows().max(1);
        self.move_cursor(Motion::PageDown(rows), false);
    }

    /// Jump to the 1-based line number at the start of `input`. Input that
    /// does not start with a number is ignored.
    pub fn go_to_line(&mut self, input: &str) -> bool {
        let Some(n) = parse_leading_int(input) else {
            return false;
        };
        let last = self.doc.line_count() - 1;
        let line = usize::try_from(n.saturating_sub(1)).unwrap_or(0).min(last);
        self.cursor.clear_anchor();
        self.place(Position::new(line, 0));
        self.reveal_cursor();
        true
    }

    /// Place the cursor under a click at screen cell `(x, y)`.
    pub fn click(&mut self, x: usize, y: usize) -> bool {
        let Some(pos) = self.viewport.position_at(&self.doc, x, y) else {
            return false;
        };
        self.cursor.clear_anchor();
        self.place(pos);
        self.reveal_cursor();
        true
    }

    // -- History ------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.doc.lines()) {
            Some(snapshot) => {
                self.adopt_snapshot(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.adopt_snapshot(&snapshot);
                true
            }
            None => false,
        }
    }

    fn adopt_snapshot(&mut self, lines: &[String]) {
        self.doc.replace_all(lines.to_vec());
        self.cursor.clamp(&self.doc);
        self.search = None;
        self.modified = true;
        self.reveal_cursor();
    }

    // -- Search -------------------------------------------------------------

    /// Make `term` the search term and jump to its next occurrence. An empty
    /// term changes nothing.
    pub fn set_search(&mut self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        self.search = Some(term.to_owned());
        self.find_next()
    }

    /// Jump to the next occurrence of the search term. The cursor stays put
    /// on a miss.
    pub fn find_next(&mut self) -> bool {
        let Some(term) = self.search.as_deref() else {
            return false;
        };
        let hit = search::find_next(&self.doc, term, self.cursor.position());
        self.jump_to(hit)
    }

    pub fn find_prev(&mut self) -> bool {
        let Some(term) = self.search.as_deref() else {
            return false;
        };
        let hit = search::find_prev(&self.doc, term, self.cursor.position());
        self.jump_to(hit)
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    /// Incremental search: adopt `term` and jump to its first occurrence in
    /// the document. An empty term clears the search.
    pub fn search_refresh(&mut self, term: &str) -> bool {
        if term.is_empty() {
            self.search = None;
            return false;
        }
        self.search = Some(term.to_owned());
        let hit = search::find_first(&self.doc, term);
        self.jump_to(hit)
    }

    fn jump_to(&mut self, hit: Option<Position>) -> bool {
        let Some(pos) = hit else {
            return false;
        };
        self.cursor.clear_anchor();
        self.place(pos);
        self.reveal_cursor();
        true
    }

    // -- Scrolling ----------------------------------------------------------

    pub const fn resize(&mut self, cols: usize, rows: usize) {
        self.viewport.resize(cols, rows);
    }

    /// Vertical notches feed momentum; horizontal ones scroll directly.
    pub fn scroll_wheel(&mut self, dir: WheelDirection) {
        let step = isize::try_from(self.config.wheel_horizontal_step).unwrap_or(isize::MAX);
        match dir {
            WheelDirection::Up => self.viewport.add_momentum(-self.config.wheel_momentum),
            WheelDirection::Down => self.viewport.add_momentum(self.config.wheel_momentum),
            WheelDirection::Left => self.viewport.scroll_horizontal(-step),
            WheelDirection::Right => self.viewport.scroll_horizontal(step),
        }
    }

    /// One animation frame. Returns whether the view moved.
    pub fn tick(&mut self) -> bool {
        self.viewport.apply_momentum(self.doc.line_count())
    }

    // -- Files --------------------------------------------------------------

    /// Write the buffer to its path.
    ///
    /// # Errors
    ///
    /// [`Error::NoPath`] for an unnamed session, or the I/O failure. The
    /// buffer stays modified on failure.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(Error::NoPath);
        };
        self.write_to(&path)
    }

    /// Save to `path`, creating its directory. The session takes the new
    /// name only once the write succeeded.
    ///
    /// # Errors
    ///
    /// Directory creation or save failure. Name and buffer are unchanged.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        tracing::debug!(path = %path.display(), "save as");
        if let Err(e) = chunk::ensure_parent_dir(&path) {
            tracing::warn!(path = %path.display(), error = %e, "save failed");
            return Err(e);
        }
        self.write_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        if let Err(e) = self.chunks.save(path, self.doc.lines()) {
            tracing::warn!(path = %path.display(), error = %e, "save failed");
            return Err(e);
        }
        self.modified = false;
        Ok(())
    }

    /// Move to the next chunk of the file, saving first if asked.
    /// Returns whether a new chunk was loaded.
    ///
    /// # Errors
    ///
    /// A failed save (nothing is loaded then) or a failed read.
    pub fn load_next_chunk(&mut self, save_first: bool) -> Result<bool> {
        if !self.chunks.truncated() {
            return Ok(false);
        }
        if save_first {
            self.save()?;
        }
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        match self.chunks.next_window(&path)? {
            Some(lines) => {
                self.adopt_chunk(lines);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move to the previous chunk of the file, saving first if asked.
    ///
    /// # Errors
    ///
    /// As for [`Session::load_next_chunk`].
    pub fn load_prev_chunk(&mut self, save_first: bool) -> Result<bool> {
        if self.chunks.current() == 0 {
            return Ok(false);
        }
        if save_first {
            self.save()?;
        }
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        match self.chunks.prev_window(&path)? {
            Some(lines) => {
                self.adopt_chunk(lines);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn adopt_chunk(&mut self, lines: Vec<String>) {
        self.doc.replace_all(lines);
        self.cursor = Cursor::new();
        self.viewport.reset();
        self.search = None;
        self.history.reset(self.doc.lines());
        self.modified = false;
    }

    // -- Status -------------------------------------------------------------

    /// File name shown in the status line.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "[No Name]".to_owned(), |n| n.to_string_lossy().into_owned())
    }

    /// ` name [Modified] [chunk] | Ln y/n, Col x | Words: w`
    #[must_use]
    pub fn status_line(&self) -> String {
        let modified = if self.modified { " [Modified]" } else { "" };
        let chunk = match (self.chunks.current(), self.chunks.truncated()) {
            (0, true) => " [Truncated - Ctrl+T for more]",
            (_, true) => " [Truncated - Ctrl+T/Ctrl+B]",
            (0, false) => "",
            (_, false) => " [Chunk view - Ctrl+B for prev]",
        };
        let pos = self.cursor.position();
        format!(
            " {}{modified}{chunk} | Ln {}/{}, Col {} | Words: {}",
            self.display_name(),
            pos.line + 1,
            self.doc.line_count(),
            pos.col + 1,
            self.word_count(),
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// The integer at the start of `s`, after optional whitespace and sign.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let n: i64 = digits[..end].parse().ok()?;
    Some(if neg { -n } else { n })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
