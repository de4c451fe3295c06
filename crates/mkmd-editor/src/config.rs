//! Engine tunables.
//!
//! | Field                   | Default  | Meaning                                   |
//! |-------------------------|----------|-------------------------------------------|
//! | `chunk_lines`           | 10 000   | Lines per chunk window                    |
//! | `max_line_bytes`        | 10 MiB   | Longest line the loader accepts           |
//! | `history_cap`           | 100      | Entries per undo and per redo stack       |
//! | `scroll_margin`         | 5        | Horizontal scroll margin, display columns |
//! | `momentum_cap`          | 250.0    | Absolute limit on wheel momentum          |
//! | `momentum_decay`        | 0.85     | Momentum multiplier per tick              |
//! | `momentum_factor`       | 0.1      | Share of momentum applied per tick        |
//! | `wheel_momentum`        | 15.0     | Momentum added per vertical wheel notch   |
//! | `wheel_horizontal_step` | 3        | Columns moved per horizontal wheel notch  |
//! | `tab_spaces`            | 4        | Spaces inserted by Tab                    |

pub const DEFAULT_CHUNK_LINES: usize = 10_000;
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;
pub const HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub chunk_lines: usize,
    pub max_line_bytes: usize,
    pub history_cap: usize,
    pub scroll_margin: usize,
    pub momentum_cap: f64,
    pub momentum_decay: f64,
    pub momentum_factor: f64,
    pub wheel_momentum: f64,
    pub wheel_horizontal_step: usize,
    pub tab_spaces: usize,
}

impl EditorConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunk_lines: DEFAULT_CHUNK_LINES,
            max_line_bytes: MAX_LINE_BYTES,
            history_cap: HISTORY_CAP,
            scroll_margin: 5,
            momentum_cap: 250.0,
            momentum_decay: 0.85,
            momentum_factor: 0.1,
            wheel_momentum: 15.0,
            wheel_horizontal_step: 3,
            tab_spaces: 4,
        }
    }

    /// Lines per chunk; zero is raised to one.
    #[must_use]
    pub const fn with_chunk_lines(mut self, lines: usize) -> Self {
        self.chunk_lines = if lines == 0 { 1 } else { lines };
        self
    }

    #[must_use]
    pub const fn with_max_line_bytes(mut self, bytes: usize) -> Self {
        self.max_line_bytes = bytes;
        self
    }

    #[must_use]
    pub const fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}
