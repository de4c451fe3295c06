//! # mkmd-editor — Editing engine for mkmd
//!
//! The document is a flat list of lines; every column is a rune (Unicode
//! scalar) offset. On top of that:
//!
//! - **[`text`]**: rune-indexed string primitives and display widths
//! - **[`position`]**: `Position` (line, col) and `Range`, 0-indexed
//! - **[`document`]**: the line store with a cached word count
//! - **[`cursor`]**: cursor motions and the selection anchor
//! - **[`history`]**: bounded snapshot undo/redo
//! - **[`chunk`]**: fixed-size windows over large files and chunked save
//! - **[`search`]**: case-insensitive wraparound search
//! - **[`viewport`]**: scroll offsets, wide-glyph clipping, wheel momentum
//! - **[`session`]**: the editor state and every editing intent
//! - **[`render`]**: painting a session into an `mkmd-term` frame

pub mod chunk;
pub mod config;
pub mod cursor;
pub mod document;
pub mod error;
pub mod history;
pub mod position;
pub mod render;
pub mod search;
pub mod session;
pub mod text;
pub mod viewport;

pub use config::EditorConfig;
pub use error::{Error, Result};
pub use session::Session;
