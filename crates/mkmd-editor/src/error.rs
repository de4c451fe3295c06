//! Error type for file operations.
//!
//! Everything else in the engine clamps instead of failing, so the only
//! errors are I/O and the per-line size cap.

use std::io;
use std::path::PathBuf;

/// Failures surfaced by loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O call failed on `path`.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single line exceeded the per-line byte cap.
    #[error("{}: line {line} is longer than {limit} bytes", path.display())]
    LineTooLong {
        path: PathBuf,
        /// 1-based line number within the file.
        line: usize,
        limit: usize,
    },

    /// Save was requested for a session with no file name.
    #[error("no file name")]
    NoPath,
}

impl Error {
    /// Wrap an `io::Error` with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
