//! Editor — cursor, document, and the frame they produce.
//!
//! An [`Editor`] is plain state: a [`Document`], the cursor, the scroll
//! offset, the screen size, and the current status message. It never
//! touches the terminal. Each iteration of the frame loop
//! ([`Session::run`](crate::session::Session::run)) asks it for two things:
//!
//! 1. [`refresh_screen`](Editor::refresh_screen) draws one frame into a
//!    [`RenderBuffer`], scrolling first so the cursor is on screen.
//! 2. [`apply_key`](Editor::apply_key) applies one decoded key and says
//!    whether to keep going.
//!
//! # Screen layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │fn main() {                   │  text area: rows − 2
//! │    loop {}                   │
//! │}                             │
//! │~                             │  filler past the last line
//! │notes.rs - 3 lines         1/3│  status bar (inverse video)
//! │HELP: Ctrl-Q = quit           │  message bar
//! └──────────────────────────────┘
//! ```
//!
//! # Keys
//!
//! Arrows move one cell. Left at column 0 wraps to the end of the previous
//! line and right at the end of a line wraps to the start of the next.
//! Page Up / Page Down move a screen's height. Home / End go to the ends of
//! the line. After any vertical move the column is clamped to the new
//! line's length. Printable bytes are inserted at the cursor. The quit key
//! ends the session; every other key is ignored.

use std::io;
use std::time::Instant;

use ewis_term::{LogicalKey, RenderBuffer, ScreenSize, ansi};

use crate::document::{Document, Row};
use crate::message::StatusMessage;
use crate::options::Options;
use crate::position::{Position, ScrollOffset};
use crate::viewport::{compute_offset, rendered_x};

/// Longest file name shown in the status bar, in bytes.
const STATUS_NAME_MAX: usize = 20;

/// What the frame loop should do after a key has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep going.
    Continue,
    /// The quit key was pressed.
    Quit,
}

/// Cursor movement by one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// All editing state. Built once by the caller and handed to the frame loop.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    cursor: Position,
    /// Rendered column of the cursor, as of the last scroll.
    rx: usize,
    offset: ScrollOffset,
    screen: ScreenSize,
    options: Options,
    message: Option<StatusMessage>,
}

impl Editor {
    /// Create an editor for `doc` on a screen of `screen` cells.
    #[must_use]
    pub const fn new(doc: Document, screen: ScreenSize, options: Options) -> Self {
        Self {
            doc,
            cursor: Position::ZERO,
            rx: 0,
            offset: ScrollOffset::ZERO,
            screen,
            options,
            message: None,
        }
    }

    /// Show `text` on the message bar from `now` until it times out.
    pub fn set_status_message(&mut self, text: impl Into<String>, now: Instant) {
        self.message = Some(StatusMessage::new(text, now));
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn offset(&self) -> ScrollOffset {
        self.offset
    }

    /// Rendered cursor column, as of the last frame.
    #[inline]
    #[must_use]
    pub const fn rendered_x(&self) -> usize {
        self.rx
    }

    #[inline]
    #[must_use]
    pub const fn screen(&self) -> ScreenSize {
        self.screen
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn status_message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Rows available for text: the screen minus the status and message
    /// bars, never less than one.
    #[must_use]
    pub fn text_rows(&self) -> usize {
        usize::from(self.screen.rows.saturating_sub(2).max(1))
    }

    /// The text area as a size, for [`compute_offset`].
    fn text_area(&self) -> ScreenSize {
        ScreenSize {
            rows: self.screen.rows.saturating_sub(2).max(1),
            cols: self.screen.cols,
        }
    }

    // -- Keys ---------------------------------------------------------------

    /// Apply one key to the cursor and document.
    pub fn apply_key(&mut self, key: LogicalKey) -> Action {
        match key {
            LogicalKey::ControlChar(byte) if byte == self.options.quit_key => {
                tracing::debug!("quit key");
                return Action::Quit;
            }
            LogicalKey::ArrowUp => self.move_cursor(Direction::Up),
            LogicalKey::ArrowDown => self.move_cursor(Direction::Down),
            LogicalKey::ArrowLeft => self.move_cursor(Direction::Left),
            LogicalKey::ArrowRight => self.move_cursor(Direction::Right),
            LogicalKey::PageUp => {
                self.cursor.y = self.cursor.y.saturating_sub(self.text_rows());
                self.clamp_column();
            }
            LogicalKey::PageDown => {
                self.cursor.y = (self.cursor.y + self.text_rows()).min(self.doc.len());
                self.clamp_column();
            }
            LogicalKey::Home => self.cursor.x = 0,
            LogicalKey::End => self.cursor.x = self.doc.line_len(self.cursor.y),
            LogicalKey::Printable(byte) => self.insert_char(byte),
            LogicalKey::Delete
            | LogicalKey::Backspace
            | LogicalKey::Escape
            | LogicalKey::ControlChar(_) => {}
        }
        Action::Continue
    }

    /// Insert `byte` at the cursor and step past it.
    fn insert_char(&mut self, byte: u8) {
        self.doc.insert_char(self.cursor, byte);
        self.cursor.x += 1;
    }

    fn move_cursor(&mut self, direction: Direction) {
        let line_len = self.doc.row(self.cursor.y).map(Row::len);
        match direction {
            Direction::Left => {
                if self.cursor.x > 0 {
                    self.cursor.x -= 1;
                } else if self.cursor.y > 0 {
                    self.cursor.y -= 1;
                    self.cursor.x = self.doc.line_len(self.cursor.y);
                }
            }
            Direction::Right => match line_len {
                Some(len) if self.cursor.x < len => self.cursor.x += 1,
                Some(len) if self.cursor.x == len => {
                    self.cursor.y += 1;
                    self.cursor.x = 0;
                }
                _ => {}
            },
            Direction::Up => self.cursor.y = self.cursor.y.saturating_sub(1),
            Direction::Down => {
                if self.cursor.y < self.doc.len() {
                    self.cursor.y += 1;
                }
            }
        }
        self.clamp_column();
    }

    /// Keep the cursor within its line.
    fn clamp_column(&mut self) {
        self.cursor.x = self.cursor.x.min(self.doc.line_len(self.cursor.y));
    }

    // -- Drawing ------------------------------------------------------------

    /// Recompute the rendered cursor column and the scroll offset.
    pub fn scroll(&mut self) {
        self.rx = self
            .doc
            .row(self.cursor.y)
            .map_or(0, |row| rendered_x(row.chars(), self.cursor.x, self.doc.tab_stop()));
        self.offset = compute_offset(self.cursor, self.rx, self.text_area(), self.offset);
    }

    /// Draw one frame into `frame`.
    ///
    /// In order: hide cursor, home, text rows, status bar, message bar,
    /// cursor to its on-screen cell, show cursor. `now` decides whether the
    /// status message has expired.
    ///
    /// # Errors
    ///
    /// Only if `frame`'s writer fails, which a [`RenderBuffer`] never does.
    pub fn refresh_screen(&mut self, frame: &mut RenderBuffer, now: Instant) -> io::Result<()> {
        self.scroll();

        ansi::cursor_hide(frame)?;
        ansi::cursor_home(frame)?;

        let text_rows = self.text_rows();
        let screen_rows = usize::from(self.screen.rows);
        self.draw_rows(frame, text_rows)?;
        if screen_rows > text_rows {
            frame.append(b"\r\n");
            self.draw_status_bar(frame)?;
        }
        if screen_rows > text_rows + 1 {
            frame.append(b"\r\n");
            self.draw_message_bar(frame, now)?;
        }

        ansi::cursor_to(frame, self.rx - self.offset.x, self.cursor.y - self.offset.y)?;
        ansi::cursor_show(frame)
    }

    /// Document lines (or `~` past the end), each followed by erase-line.
    fn draw_rows(&self, frame: &mut RenderBuffer, text_rows: usize) -> io::Result<()> {
        let cols = usize::from(self.screen.cols);
        for y in 0..text_rows {
            if y > 0 {
                frame.append(b"\r\n");
            }
            match self.doc.row(y + self.offset.y) {
                Some(row) => {
                    let render = row.render();
                    let start = self.offset.x.min(render.len());
                    let end = (start + cols).min(render.len());
                    frame.append(&render[start..end]);
                }
                None => frame.append(b"~"),
            }
            ansi::clear_line(frame)?;
        }
        Ok(())
    }

    /// `name - N lines` on the left, `line/total` on the right, in inverse
    /// video across the full width.
    fn draw_status_bar(&self, frame: &mut RenderBuffer) -> io::Result<()> {
        let cols = usize::from(self.screen.cols);
        let name = self.doc.display_name();
        let name = name.as_deref().unwrap_or("[No Name]").as_bytes();
        let name = &name[..name.len().min(STATUS_NAME_MAX)];

        let mut left = name.to_vec();
        left.extend_from_slice(format!(" - {} lines", self.doc.len()).as_bytes());
        let right = format!("{}/{}", self.cursor.y + 1, self.doc.len());
        let right = right.as_bytes();

        let right_start = cols.saturating_sub(right.len());
        let left_len = left.len().min(right_start);

        ansi::inverse(frame)?;
        frame.append(&left[..left_len]);
        frame.append_repeated(b' ', right_start - left_len);
        frame.append(&right[..right.len().min(cols)]);
        ansi::reset(frame)
    }

    /// Erase the line, then the status message if it is still fresh.
    fn draw_message_bar(&self, frame: &mut RenderBuffer, now: Instant) -> io::Result<()> {
        ansi::clear_line(frame)?;
        if let Some(text) = self
            .message
            .as_ref()
            .and_then(|m| m.visible(now, self.options.message_timeout))
        {
            let text = text.as_bytes();
            frame.append(&text[..text.len().min(usize::from(self.screen.cols))]);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
