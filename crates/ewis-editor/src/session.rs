//! Session — the frame loop, run inside raw mode.
//!
//! A [`Session`] owns everything that touches the terminal: the raw-mode
//! guard, the key decoder over the input stream, the output stream, and
//! the frame buffer. The [`Editor`] is passed in; the session never builds
//! one itself.
//!
//! ```text
//!   ┌──────────────┐  refresh_screen  ┌──────────────┐  flush_to  ┌──────┐
//!   │    Editor    │ ───────────────▶ │ RenderBuffer │ ─────────▶ │ out  │
//!   └──────────────┘                  └──────────────┘  1 write   └──────┘
//!          ▲
//!          │ apply_key                ┌──────────────┐   read     ┌──────┐
//!          └───────────────────────── │  KeyDecoder  │ ◀───────── │  in  │
//!                                     └──────────────┘            └──────┘
//! ```
//!
//! Raw mode is left exactly once whatever happens: on quit the screen is
//! cleared and homed first, on error (here or in a failed size query) it
//! gets a best-effort reset, and in both cases the captured settings go
//! back before [`run`](Session::run) returns. A session dropped without
//! running restores them on drop.

use std::io::{Read, Write};
use std::time::Instant;

use ewis_term::terminal::{self, Discipline, RawMode};
use ewis_term::{KeyDecoder, RenderBuffer, ScreenSize, TermError, ansi, geometry};

use crate::editor::{Action, Editor};
use crate::error::EditorError;

/// A raw-mode terminal session over `input` and `out`.
pub struct Session<D: Discipline, R: Read, W: Write> {
    raw: RawMode<D>,
    keys: KeyDecoder<R>,
    out: W,
    frame: RenderBuffer,
}

impl<D: Discipline, R: Read, W: Write> Session<D, R, W> {
    /// Enter raw mode on `discipline` and take over `input` and `out`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Terminal`] if raw mode can't be entered.
    pub fn start(discipline: D, input: R, out: W) -> Result<Self, EditorError> {
        let raw = RawMode::enable(discipline)?;
        Ok(Self {
            raw,
            keys: KeyDecoder::new(input),
            out,
            frame: RenderBuffer::new(),
        })
    }

    /// Work out the screen size.
    ///
    /// `reported` is what the OS said, if anything. Without it the terminal
    /// is asked directly, which is why this needs raw mode and lives here.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Terminal`] if the fallback query fails. The
    /// screen has been reset by then, since the query moved the cursor.
    pub fn screen_size(&mut self, reported: Option<ScreenSize>) -> Result<ScreenSize, EditorError> {
        let size = match geometry::query_size(reported, &mut self.out, self.keys.get_mut()) {
            Ok(size) => size,
            Err(e) => {
                tracing::error!(error = %e, "screen size query failed");
                terminal::reset_screen(&mut self.out);
                return Err(e.into());
            }
        };
        tracing::info!(rows = size.rows, cols = size.cols, "screen size");
        Ok(size)
    }

    /// Whether raw mode is still active.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw.is_active()
    }

    /// Run the frame loop until the quit key, then leave raw mode.
    ///
    /// # Errors
    ///
    /// Returns the first terminal error (failed read or write). The terminal
    /// has been reset and raw mode left by the time it is returned.
    pub fn run(mut self, editor: &mut Editor) -> Result<(), EditorError> {
        tracing::info!("session started");
        let result = self.run_inner(editor).and_then(|()| self.clear_screen());

        if let Err(e) = &result {
            tracing::error!(error = %e, "session failed");
            terminal::reset_screen(&mut self.out);
        }

        // Always restore, even if the loop errored.
        let restored = self.raw.disable().map_err(EditorError::from);
        tracing::info!("session ended");
        result.and(restored)
    }

    /// Render, read one key, apply it. Repeat.
    fn run_inner(&mut self, editor: &mut Editor) -> Result<(), EditorError> {
        loop {
            editor
                .refresh_screen(&mut self.frame, Instant::now())
                .map_err(TermError::Write)?;
            self.flush()?;

            let key = self.keys.read_key()?;
            if editor.apply_key(key) == Action::Quit {
                return Ok(());
            }
        }
    }

    /// The last frame: an empty screen with the cursor home.
    fn clear_screen(&mut self) -> Result<(), EditorError> {
        ansi::clear_screen(&mut self.frame).map_err(TermError::Write)?;
        ansi::cursor_home(&mut self.frame).map_err(TermError::Write)?;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), EditorError> {
        let complete = self.frame.flush_to(&mut self.out).map_err(TermError::Write)?;
        if !complete {
            tracing::warn!("short write, frame truncated");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::options::Options;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Stands in for termios and records every call. Snapshots are numbers.
    #[derive(Clone, Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        fn restores(&self) -> Vec<String> {
            self.calls().into_iter().filter(|c| c.starts_with("restore")).collect()
        }
    }

    impl Discipline for Recorder {
        type Snapshot = u32;

        fn capture(&mut self) -> Result<u32, TermError> {
            self.log.borrow_mut().push("capture".into());
            Ok(42)
        }

        fn enter_raw(&mut self, original: &u32) -> Result<(), TermError> {
            self.log.borrow_mut().push(format!("raw {original}"));
            Ok(())
        }

        fn restore(&mut self, original: &u32) -> Result<(), TermError> {
            self.log.borrow_mut().push(format!("restore {original}"));
            Ok(())
        }
    }

    /// Yields its bytes, then fails.
    struct Failing<'a>(&'a [u8]);

    impl Read for Failing<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::other("tty gone"));
            }
            self.0.read(buf)
        }
    }

    /// Records each `write()` separately.
    #[derive(Default)]
    struct Writes(Vec<Vec<u8>>);

    impl Write for Writes {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Refuses every write.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn editor(text: &[u8]) -> Editor {
        Editor::new(
            Document::from_bytes(text, 4),
            ScreenSize::new(6, 40).unwrap(),
            Options::default(),
        )
    }

    // -- Raw mode -----------------------------------------------------------

    #[test]
    fn quit_restores_once_with_captured_snapshot() {
        let rec = Recorder::default();
        let mut out = Vec::new();
        let session = Session::start(rec.clone(), &b"\x11"[..], &mut out).unwrap();
        assert!(session.is_raw());

        session.run(&mut editor(b"")).unwrap();
        assert_eq!(rec.calls(), ["capture", "raw 42", "restore 42"]);
    }

    #[test]
    fn read_error_restores_once_with_captured_snapshot() {
        let rec = Recorder::default();
        let mut out = Vec::new();
        let session = Session::start(rec.clone(), Failing(b"ab"), &mut out).unwrap();

        let err = session.run(&mut editor(b"")).unwrap_err();
        assert!(matches!(err, EditorError::Terminal(TermError::Read(_))));
        assert_eq!(rec.restores(), ["restore 42"]);
    }

    #[test]
    fn write_error_restores_once() {
        let rec = Recorder::default();
        let session = Session::start(rec.clone(), &b"\x11"[..], Closed).unwrap();

        let err = session.run(&mut editor(b"")).unwrap_err();
        assert!(matches!(err, EditorError::Terminal(TermError::Write(_))));
        assert_eq!(rec.restores(), ["restore 42"]);
    }

    #[test]
    fn dropped_session_restores() {
        let rec = Recorder::default();
        {
            let _session = Session::start(rec.clone(), &b""[..], Vec::new()).unwrap();
        }
        assert_eq!(rec.restores(), ["restore 42"]);
    }

    // -- Output -------------------------------------------------------------

    #[test]
    fn quit_clears_screen_last() {
        let mut out = Vec::new();
        let session = Session::start(Recorder::default(), &b"\x11"[..], &mut out).unwrap();
        session.run(&mut editor(b"hello")).unwrap();
        assert!(out.ends_with(b"\x1b[?25h\x1b[2J\x1b[H"));
    }

    #[test]
    fn error_resets_screen() {
        let mut out = Vec::new();
        let session = Session::start(Recorder::default(), Failing(b""), &mut out).unwrap();
        assert!(session.run(&mut editor(b"")).is_err());
        assert!(out.ends_with(b"\x1b[2J\x1b[H\x1b[?25h"));
        assert_eq!(out.windows(4).filter(|w| *w == b"\x1b[2J").count(), 1);
    }

    #[test]
    fn each_frame_is_one_write() {
        let mut out = Writes::default();
        let session = Session::start(Recorder::default(), &b"ab\x11"[..], &mut out).unwrap();
        session.run(&mut editor(b"")).unwrap();

        // Three frames (before 'a', before 'b', before Ctrl-Q), then the
        // clearing frame.
        assert_eq!(out.0.len(), 4);
        for frame in &out.0[..3] {
            assert!(frame.starts_with(b"\x1b[?25l\x1b[H"));
            assert!(frame.ends_with(b"\x1b[?25h"));
        }
        assert_eq!(out.0[3], b"\x1b[2J\x1b[H");
    }

    // -- Keys ---------------------------------------------------------------

    #[test]
    fn keys_reach_the_editor() {
        let mut ed = editor(b"ab\n");
        let session = Session::start(Recorder::default(), &b"\x1b[Cx\x1b[Fy\x11"[..], Vec::new()).unwrap();
        session.run(&mut ed).unwrap();
        assert_eq!(ed.document().row(0).unwrap().chars(), b"axby");
    }

    #[test]
    fn other_control_keys_do_not_quit() {
        let mut ed = editor(b"");
        let session = Session::start(Recorder::default(), &b"\x1b\x13\x7fz\x11"[..], Vec::new()).unwrap();
        session.run(&mut ed).unwrap();
        assert_eq!(ed.document().row(0).unwrap().chars(), b"z");
    }

    // -- Geometry -----------------------------------------------------------

    #[test]
    fn screen_size_uses_report() {
        let mut out = Vec::new();
        let mut session = Session::start(Recorder::default(), &b""[..], &mut out).unwrap();
        let reported = ScreenSize::new(30, 100);
        assert_eq!(session.screen_size(reported).unwrap(), reported.unwrap());
        drop(session);
        assert!(out.is_empty());
    }

    #[test]
    fn screen_size_falls_back_to_cursor_query() {
        let mut session = Session::start(Recorder::default(), &b"\x1b[24;80R\x11"[..], Vec::new()).unwrap();
        let size = session.screen_size(None).unwrap();
        assert_eq!(size, ScreenSize::new(24, 80).unwrap());

        // The rest of the input is still there for the frame loop.
        let mut ed = Editor::new(Document::empty(4), size, Options::default());
        session.run(&mut ed).unwrap();
    }

    #[test]
    fn screen_size_failure_is_geometry_error() {
        let rec = Recorder::default();
        let mut session = Session::start(rec.clone(), &b"garbage"[..], Vec::new()).unwrap();
        let err = session.screen_size(None).unwrap_err();
        assert!(matches!(err, EditorError::Terminal(TermError::Geometry(_))));
        drop(session);
        assert_eq!(rec.restores(), ["restore 42"]);
    }

    #[test]
    fn screen_size_failure_resets_screen() {
        let mut out = Vec::new();
        let mut session = Session::start(Recorder::default(), &b"garbage"[..], &mut out).unwrap();
        assert!(session.screen_size(None).is_err());
        drop(session);
        assert!(out.starts_with(b"\x1b[999C\x1b[999B\x1b[6n"));
        assert!(out.ends_with(b"\x1b[2J\x1b[H\x1b[?25h"));
    }
}
