//! Chunked loading and saving of large files.
//!
//! Only one fixed-size window of a file is held in memory at a time. Chunk
//! `k` is file lines `[k * max_lines, (k + 1) * max_lines)` as the file
//! stood when it was read. No total line count is kept; each navigation
//! re-opens the file and skips forward.
//!
//! # Line reading
//!
//! Lines split on `\n` with one trailing `\r` stripped. A final line with
//! no terminator still counts, and a trailing `\n` does not produce an
//! extra empty line. Any single line longer than `max_line_bytes` fails the
//! read with [`Error::LineTooLong`] instead of being buffered. Invalid
//! UTF-8 is replaced with U+FFFD.
//!
//! # Saving
//!
//! A file that fits in one chunk is written out whole. Otherwise the file is
//! re-read, the span of the current chunk is replaced by the live lines,
//! and everything is written back. If the live chunk gained or lost lines,
//! every later chunk boundary shifts by that amount ("spillover").

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::EditorConfig;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Line reader
// ---------------------------------------------------------------------------

struct LineReader<'a, R> {
    inner: R,
    path: &'a Path,
    limit: usize,
    line_no: usize,
    buf: Vec<u8>,
}

impl<'a, R: BufRead> LineReader<'a, R> {
    const fn new(inner: R, path: &'a Path, limit: usize) -> Self {
        Self {
            inner,
            path,
            limit,
            line_no: 0,
            buf: Vec::new(),
        }
    }

    /// Read the next line into `self.buf` without its terminator.
    /// Returns `false` at end of file.
    fn advance(&mut self) -> Result<bool> {
        self.buf.clear();
        // Room for the limit plus "\r\n".
        let cap = u64::try_from(self.limit).unwrap_or(u64::MAX).saturating_add(2);
        let n = (&mut self.inner)
            .take(cap)
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| Error::io(self.path, e))?;
        if n == 0 {
            return Ok(false);
        }
        self.line_no += 1;

        let terminated = self.buf.last() == Some(&b'\n');
        if terminated {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        if self.buf.len() > self.limit || (!terminated && n as u64 == cap) {
            return Err(Error::LineTooLong {
                path: self.path.to_path_buf(),
                line: self.line_no,
                limit: self.limit,
            });
        }
        Ok(true)
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if self.advance()? {
            Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
        } else {
            Ok(None)
        }
    }
}

/// A run of lines read from a file, and whether more follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub lines: Vec<String>,
    pub has_more: bool,
}

/// Skip `skip` lines of `path`, read up to `take`, then probe for one more.
///
/// # Errors
///
/// I/O failures, including a missing file, and over-long lines.
pub fn read_window(path: &Path, skip: usize, take: usize, max_line_bytes: usize) -> Result<Window> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = LineReader::new(BufReader::new(file), path, max_line_bytes);

    for _ in 0..skip {
        if !reader.advance()? {
            return Ok(Window {
                lines: Vec::new(),
                has_more: false,
            });
        }
    }

    let mut lines = Vec::new();
    while lines.len() < take {
        match reader.next_line()? {
            Some(line) => lines.push(line),
            None => {
                return Ok(Window {
                    lines,
                    has_more: false,
                });
            }
        }
    }
    let has_more = reader.advance()?;
    Ok(Window { lines, has_more })
}

/// Every line of `path`; a missing file reads as no lines.
fn read_all(path: &Path, max_line_bytes: usize) -> Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(path, e)),
    };
    let mut reader = LineReader::new(BufReader::new(file), path, max_line_bytes);
    let mut lines = Vec::new();
    while let Some(line) = reader.next_line()? {
        lines.push(line);
    }
    Ok(lines)
}

/// Write `lines` joined by `\n`, with no trailing newline.
fn write_lines<'s>(path: &Path, lines: impl IntoIterator<Item = &'s String>) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut w = BufWriter::new(file);
    let mut write = || -> io::Result<()> {
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                w.write_all(b"\n")?;
            }
            w.write_all(line.as_bytes())?;
        }
        w.flush()
    };
    write().map_err(|e| Error::io(path, e))
}

// ---------------------------------------------------------------------------
// Chunk state
// ---------------------------------------------------------------------------

/// Which window of the file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunks {
    current: usize,
    max_lines: usize,
    max_line_bytes: usize,
    truncated: bool,
}

impl Chunks {
    #[must_use]
    pub const fn new(config: &EditorConfig) -> Self {
        Self {
            current: 0,
            max_lines: if config.chunk_lines == 0 { 1 } else { config.chunk_lines },
            max_line_bytes: config.max_line_bytes,
            truncated: false,
        }
    }

    /// Index of the loaded chunk.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    #[inline]
    #[must_use]
    pub const fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Whether the file continues past the loaded chunk.
    #[inline]
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Whether saving must splice into the existing file.
    #[inline]
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.current > 0 || self.truncated
    }

    /// Load the first chunk of `path`. A missing file is an empty document.
    ///
    /// # Errors
    ///
    /// I/O failures other than not-found, and over-long lines.
    pub fn load(&mut self, path: &Path) -> Result<Vec<String>> {
        self.current = 0;
        self.truncated = false;
        let window = match read_window(path, 0, self.max_lines, self.max_line_bytes) {
            Ok(w) => w,
            Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "new file");
                return Ok(vec![String::new()]);
            }
            Err(e) => return Err(e),
        };
        self.truncated = window.has_more;
        tracing::debug!(
            path = %path.display(),
            lines = window.lines.len(),
            truncated = self.truncated,
            "loaded"
        );
        Ok(non_empty(window.lines))
    }

    /// Load the chunk after the current one. `None` when there is nothing
    /// after it; the state is unchanged in that case.
    ///
    /// # Errors
    ///
    /// I/O failures and over-long lines. The state is unchanged.
    pub fn next_window(&mut self, path: &Path) -> Result<Option<Vec<String>>> {
        if !self.truncated {
            return Ok(None);
        }
        let skip = (self.current + 1) * self.max_lines;
        let window = read_window(path, skip, self.max_lines, self.max_line_bytes)?;
        if window.lines.is_empty() {
            return Ok(None);
        }
        self.current += 1;
        self.truncated = window.has_more;
        tracing::debug!(chunk = self.current, truncated = self.truncated, "next chunk");
        Ok(Some(window.lines))
    }

    /// Load the chunk before the current one. `None` on the first chunk.
    ///
    /// # Errors
    ///
    /// I/O failures and over-long lines. The state is unchanged.
    pub fn prev_window(&mut self, path: &Path) -> Result<Option<Vec<String>>> {
        if self.current == 0 {
            return Ok(None);
        }
        let skip = (self.current - 1) * self.max_lines;
        let window = read_window(path, skip, self.max_lines, self.max_line_bytes)?;
        self.current -= 1;
        self.truncated = true;
        tracing::debug!(chunk = self.current, "previous chunk");
        Ok(Some(non_empty(window.lines)))
    }

    /// Write `lines` back to `path`, splicing into the file when only part
    /// of it is loaded.
    ///
    /// # Errors
    ///
    /// Any read or write failure. Nothing in `self` changes either way.
    pub fn save(&self, path: &Path, lines: &[String]) -> Result<()> {
        if !self.is_partial() {
            write_lines(path, lines)?;
            tracing::info!(path = %path.display(), lines = lines.len(), "saved");
            return Ok(());
        }

        let all = read_all(path, self.max_line_bytes)?;
        let start = (self.current * self.max_lines).min(all.len());
        let end = (start + self.max_lines).min(all.len());
        write_lines(
            path,
            all[..start].iter().chain(lines).chain(&all[end..]),
        )?;
        tracing::info!(
            path = %path.display(),
            chunk = self.current,
            replaced = end - start,
            written = lines.len(),
            "saved chunk"
        );
        Ok(())
    }
}

fn non_empty(mut lines: Vec<String>) -> Vec<String> {
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Create the parent directory of `path` if it has one.
///
/// # Errors
///
/// Returns the `create_dir_all` failure.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
