// SPDX-License-Identifier: MIT
//
// mkmd-term: the terminal surface for mkmd.
//
// Direct terminal control through ANSI escape sequences and raw termios:
// a cell grid the editor paints into, a differential renderer that only
// emits changed cells, an input decoder for keys, mouse and paste, and an
// event loop that ties them together.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod event_loop;
pub mod input;
pub mod reader;
pub mod render;
pub mod terminal;
