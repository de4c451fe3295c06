// SPDX-License-Identifier: MIT
//
// mkmd — a terminal Markdown and plain-text editor.
//
// This is the main binary that wires together the two crates:
//
//   mkmd-term   → terminal control, rendering, input parsing, event loop
//   mkmd-editor → document, cursor, history, chunked file access, search
//
// The Editor in app.rs implements mkmd-term's App trait. Files larger than
// one chunk are opened a window at a time; Ctrl+T and Ctrl+B move between
// windows.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← h - 1 rows
//   ├──────────────────────────────┤
//   │ status line / prompt         │  ← 1 row
//   └──────────────────────────────┘
//
// Diagnostics go to a log file, never the terminal: the alternate screen
// owns stdout while the editor runs.

mod app;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mkmd_editor::chunk;
use mkmd_editor::{EditorConfig, Session};
use mkmd_term::event_loop::EventLoop;

use crate::app::Editor;

const KEY_HELP: &str = "\
Keys:
  Ctrl+S  save            Ctrl+D  save and quit     Ctrl+Q  quit
  Ctrl+Z  undo            Ctrl+Y  redo              Ctrl+A  select all
  Ctrl+X  cut             Ctrl+C  copy              Ctrl+V  paste
  Ctrl+F  search          F3      find next         F4      incremental search
  Ctrl+G  go to line      Ctrl+T  next chunk        Ctrl+B  previous chunk
  Shift+arrows select, Ctrl+Left/Right move by word, mouse wheel scrolls.

Set MKMD_LOG (e.g. MKMD_LOG=debug) to control log verbosity.";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mkmd")]
#[command(about = "A terminal Markdown and plain-text editor that opens huge files in chunks", long_about = None)]
#[command(version)]
#[command(after_help = KEY_HELP)]
struct Args {
    /// File to edit. It is created on the first save if it does not exist.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Lines per chunk when opening large files
    #[arg(long, value_name = "N")]
    chunk_lines: Option<usize>,

    /// Path to log file (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to `path`. Logging stays off when the file cannot
/// be opened.
fn init_logging(path: &Path) {
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("MKMD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn open_session(args: &Args) -> mkmd_editor::Result<Session> {
    let mut config = EditorConfig::new();
    if let Some(lines) = args.chunk_lines {
        config = config.with_chunk_lines(lines);
    }
    match &args.file {
        Some(path) => {
            chunk::ensure_parent_dir(path)?;
            Session::open(path.clone(), config)
        }
        None => Ok(Session::new(config)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("mkmd.log"));
    init_logging(&log_path);

    let session = match open_session(&args) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("mkmd: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(path = ?args.file, "starting");

    let mut editor = Editor::new(session);
    if let Err(e) = EventLoop::new().run(&mut editor) {
        eprintln!("mkmd: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// ─── Tests ──────────────────────────────────────────────────────────────────
