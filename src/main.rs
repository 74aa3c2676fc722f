// SPDX-License-Identifier: MIT
//
// ewis — a minimal terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   ewis-term   → raw mode, screen size, key decoding, frame output
//   ewis-editor → document, cursor, viewport, frame loop
//
// Startup order matters. The document is loaded before raw mode is
// entered, so a bad path is reported on a normal terminal. The screen
// size is queried after, because the fallback query reads the reply
// from stdin and needs raw mode for that.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status bar (inverse)         │  ← name, line count, line/total
//   ├──────────────────────────────┤
//   │ message bar                  │  ← HELP text, fades after a timeout
//   └──────────────────────────────┘

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ewis_editor::document::Document;
use ewis_editor::options::{DEFAULT_MESSAGE_TIMEOUT, DEFAULT_TAB_STOP};
use ewis_editor::{Editor, EditorError, Options, Session};
use ewis_term::terminal::{self, RawStdin, RawStdout, Termios};

/// Shown on the message bar when the editor opens.
const HELP: &str = "HELP: Ctrl-Q = quit";

// ─── Command Line ───────────────────────────────────────────────────────────

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "ewis", version, about = "A minimal terminal text editor")]
struct Args {
    /// File to open. Opens an empty buffer if omitted or if the file does
    /// not exist yet.
    path: Option<PathBuf>,

    /// Tab width in columns.
    #[arg(long, default_value_t = DEFAULT_TAB_STOP)]
    tab_stop: usize,

    /// Seconds a status message stays visible.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_MESSAGE_TIMEOUT.as_secs())]
    message_timeout: u64,

    /// Write logs to this file (filtered by `RUST_LOG`, default `info`).
    #[arg(long, value_name = "FILE", env = "EWIS_LOG")]
    log: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> Options {
        Options::default()
            .with_tab_stop(self.tab_stop)
            .with_message_timeout(Duration::from_secs(self.message_timeout))
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send tracing output to `path`.
///
/// The terminal belongs to the editor, so logs only ever go to a file.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Fails only if a subscriber is already installed; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

// ─── Run ────────────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<(), EditorError> {
    let options = args.options();
    let doc = match &args.path {
        Some(path) => Document::open(path, options.tab_stop())?,
        None => Document::empty(options.tab_stop()),
    };

    if !terminal::is_tty() {
        tracing::warn!("stdin is not a terminal");
    }
    let mut session = Session::start(Termios::stdin(), RawStdin, RawStdout)?;
    let size = session.screen_size(terminal::window_size())?;

    let mut editor = Editor::new(doc, size, options);
    editor.set_status_message(HELP, Instant::now());
    session.run(&mut editor)
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log {
        if let Err(e) = init_logging(path) {
            eprintln!("ewis: cannot open log file {}: {e}", path.display());
            process::exit(1);
        }
    }
    tracing::info!(path = ?args.path, "startup");

    // The session has already reset the screen and left raw mode.
    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "fatal");
        eprintln!("ewis: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
