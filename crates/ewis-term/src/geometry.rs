// SPDX-License-Identifier: MIT
//
// Screen geometry — how many rows and columns the editor can draw into.
//
// The OS usually answers directly (`TIOCGWINSZ`, see `terminal::window_size`).
// When it can't, we fall back to asking the terminal itself: push the
// cursor as far right and down as it goes, then request a cursor position
// report. The terminal clamps the cursor at its real edge, so the reported
// position *is* the screen size.
//
// The reply `ESC [ rows ; cols R` arrives on stdin, the same byte stream
// keystrokes use. It is read here by a dedicated loop capped at
// `REPLY_MAX` bytes that stops at the `R` terminator, so whatever follows
// the reply stays in the stream for the key decoder.

use std::io::{Read, Write};

use crate::ansi;
use crate::error::{CursorPositionError, TermError};
use crate::input::read_byte;

/// Upper bound on the length of a cursor position reply.
///
/// `ESC [ 65535 ; 65535 R` is 15 bytes; 32 leaves room for junk without
/// letting a misbehaving terminal keep us reading forever.
const REPLY_MAX: usize = 32;

// ─── ScreenSize ─────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl ScreenSize {
    /// Create a size, rejecting zero rows or zero columns.
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            None
        } else {
            Some(Self { rows, cols })
        }
    }
}

// ─── Cursor position reply ──────────────────────────────────────────────────

/// Parse a cursor position reply of the form `ESC [ rows ; cols R`.
///
/// Control characters after the `ESC [` introducer are ignored, then the
/// `R` terminator is stripped and the rest split on `;`.
///
/// # Errors
///
/// Returns [`CursorPositionError::Malformed`] if the introducer or the
/// terminator is missing, there aren't exactly two numeric fields, or
/// either field is zero.
pub fn parse_cursor_report(reply: &[u8]) -> Result<ScreenSize, CursorPositionError> {
    let malformed = || CursorPositionError::malformed(reply);

    let body = reply.strip_prefix(b"\x1b[").ok_or_else(malformed)?;
    let body: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_control())
        .collect();
    let body = body.strip_suffix(b"R").ok_or_else(malformed)?;
    let text = std::str::from_utf8(body).map_err(|_| malformed())?;

    let mut fields = text.split(';');
    let (Some(rows), Some(cols), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(malformed());
    };
    let rows: u16 = rows.parse().map_err(|_| malformed())?;
    let cols: u16 = cols.parse().map_err(|_| malformed())?;

    ScreenSize::new(rows, cols).ok_or_else(malformed)
}

/// Read a cursor position reply off `input`, up to and including `R`.
///
/// Stops early when a read times out or after [`REPLY_MAX`] bytes; the
/// partial reply is returned and left for [`parse_cursor_report`] to reject.
///
/// # Errors
///
/// Returns [`CursorPositionError::Read`] if the underlying read fails.
pub fn read_cursor_report(input: &mut impl Read) -> Result<Vec<u8>, CursorPositionError> {
    let mut reply = Vec::with_capacity(REPLY_MAX);
    while reply.len() < REPLY_MAX {
        let Some(byte) = read_byte(input).map_err(CursorPositionError::Read)? else {
            break;
        };
        reply.push(byte);
        if byte == b'R' {
            break;
        }
    }
    Ok(reply)
}

/// Ask the terminal where the cursor is and wait for the answer.
///
/// # Errors
///
/// Returns a [`CursorPositionError`] if the query can't be written, the
/// reply can't be read, or the reply is malformed.
pub fn query_cursor_position(
    out: &mut impl Write,
    input: &mut impl Read,
) -> Result<ScreenSize, CursorPositionError> {
    ansi::query_cursor_position(out).map_err(CursorPositionError::Query)?;
    out.flush().map_err(CursorPositionError::Query)?;

    let reply = read_cursor_report(input)?;
    tracing::trace!(reply = %reply.escape_ascii(), "cursor position reply");
    parse_cursor_report(&reply)
}

// ─── Screen size ────────────────────────────────────────────────────────────

/// Determine the screen size.
///
/// `reported` is the OS answer (see [`window_size`](crate::terminal::window_size)).
/// When it is `None` the escape-sequence fallback runs over `out` / `input`,
/// which must already be in raw mode.
///
/// # Errors
///
/// Returns [`TermError::Geometry`] if the fallback fails.
pub fn query_size(
    reported: Option<ScreenSize>,
    out: &mut impl Write,
    input: &mut impl Read,
) -> Result<ScreenSize, TermError> {
    if let Some(size) = reported {
        return Ok(size);
    }

    tracing::debug!("window size ioctl unavailable, probing with cursor position report");
    ansi::cursor_to_bottom_right(out)
        .map_err(|e| TermError::Geometry(CursorPositionError::Query(e)))?;
    let size = query_cursor_position(out, input).map_err(TermError::Geometry)?;
    tracing::debug!(rows = size.rows, cols = size.cols, "screen size from cursor report");
    Ok(size)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
