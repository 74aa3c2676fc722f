// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns the raw byte stream from a raw-mode terminal into logical keys.
// Ordinary bytes map one-to-one. The escape byte is the hard part: it is
// both the Escape key and the first byte of every arrow / navigation
// sequence, and the two look identical until the next byte shows up.
//
// # Escape vs escape-sequence ambiguity
//
// Raw mode is configured with `VMIN = 0, VTIME = 1`: a read returns
// whatever is available, or zero bytes after a tenth of a second. After
// an ESC we read up to two more bytes. If either read comes back empty,
// nobody is typing a sequence and the user pressed Escape. A link slow
// enough to split a sequence across that window will decode it as a bare
// Escape followed by literal bytes; that is a known limitation.
//
// # Recognised sequences
//
// | Bytes          | Key                                         |
// |----------------|---------------------------------------------|
// | `ESC [ A..D`   | arrows                                      |
// | `ESC [ H / F`  | Home / End                                  |
// | `ESC O H / F`  | Home / End (application cursor mode)        |
// | `ESC [ n ~`    | 1,7 Home · 3 Delete · 4,8 End · 5 PgUp · 6 PgDn |
//
// Everything else after an ESC decodes as `Escape`. Unknown input is
// never an error: a stray sequence must not take the editor down.

use std::io::{self, Read};

use crate::ansi::ESC;
use crate::error::{TermError, is_transient};

// ─── Logical keys ───────────────────────────────────────────────────────────

/// One decoded keypress.
///
/// This is the only representation of input the editor sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// A byte to insert as-is (0x20..=0x7E and 0x80..=0xFF).
    Printable(u8),
    // ── Navigation ──────────────────────────────────────────────
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
    Backspace,
    /// A bare Escape, or an escape sequence we don't recognise.
    Escape,
    /// A C0 control byte (0x00..=0x1F other than ESC), e.g. Ctrl-Q = 0x11.
    ControlChar(u8),
}

impl LogicalKey {
    /// Map a single non-escape byte to its key.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            ESC => Self::Escape,
            0x7F => Self::Backspace,
            b @ 0x00..=0x1F => Self::ControlChar(b),
            b => Self::Printable(b),
        }
    }
}

/// The byte a terminal sends for Ctrl + `letter`.
///
/// Ctrl clears bits 5 and 6, so `ctrl_key(b'q') == 0x11`.
#[inline]
#[must_use]
pub const fn ctrl_key(letter: u8) -> u8 {
    letter & 0x1f
}

// ─── Sequence table ─────────────────────────────────────────────────────────

/// Shape of an escape sequence, identified by the bytes after ESC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sequence {
    /// `ESC [ <final>`
    Csi,
    /// `ESC [ <digit> ~`
    CsiTilde,
    /// `ESC O <final>`
    Ss3,
}

/// Every recognised sequence, keyed by shape and distinguishing byte.
///
/// For `Csi` / `Ss3` the byte is the final letter; for `CsiTilde` it is
/// the digit before the `~`.
#[rustfmt::skip]
const SEQUENCES: &[(Sequence, u8, LogicalKey)] = &[
    (Sequence::Csi,      b'A', LogicalKey::ArrowUp),
    (Sequence::Csi,      b'B', LogicalKey::ArrowDown),
    (Sequence::Csi,      b'C', LogicalKey::ArrowRight),
    (Sequence::Csi,      b'D', LogicalKey::ArrowLeft),
    (Sequence::Csi,      b'H', LogicalKey::Home),
    (Sequence::Csi,      b'F', LogicalKey::End),
    (Sequence::Ss3,      b'H', LogicalKey::Home),
    (Sequence::Ss3,      b'F', LogicalKey::End),
    (Sequence::CsiTilde, b'1', LogicalKey::Home),
    (Sequence::CsiTilde, b'3', LogicalKey::Delete),
    (Sequence::CsiTilde, b'4', LogicalKey::End),
    (Sequence::CsiTilde, b'5', LogicalKey::PageUp),
    (Sequence::CsiTilde, b'6', LogicalKey::PageDown),
    (Sequence::CsiTilde, b'7', LogicalKey::Home),
    (Sequence::CsiTilde, b'8', LogicalKey::End),
];

/// Look a sequence up in [`SEQUENCES`]. Unknown sequences are `Escape`.
fn classify(kind: Sequence, byte: u8) -> LogicalKey {
    SEQUENCES
        .iter()
        .find(|&&(k, b, _)| k == kind && b == byte)
        .map_or(LogicalKey::Escape, |&(_, _, key)| key)
}

// ─── Reading ────────────────────────────────────────────────────────────────

/// Read at most one byte.
///
/// `Ok(None)` means nothing arrived within the raw-mode timeout (a zero
/// byte read, `EAGAIN` or `EINTR`).
///
/// # Errors
///
/// Returns any other I/O error from the reader.
pub fn read_byte(input: &mut impl Read) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    match input.read(&mut byte) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(byte[0])),
        Err(e) if is_transient(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads logical keys from a raw-mode byte stream.
///
/// Generic over the reader so tests can feed a byte slice; at the end of
/// a slice every read returns zero bytes, which looks exactly like a
/// timeout.
///
/// # Example
///
/// ```
/// use ewis_term::input::{KeyDecoder, LogicalKey};
///
/// let mut keys = KeyDecoder::new(&b"\x1b[A"[..]);
/// assert_eq!(keys.read_key()?, LogicalKey::ArrowUp);
/// # Ok::<(), ewis_term::TermError>(())
/// ```
#[derive(Debug)]
pub struct KeyDecoder<R> {
    input: R,
}

impl<R: Read> KeyDecoder<R> {
    /// Wrap a reader.
    pub const fn new(input: R) -> Self {
        Self { input }
    }

    /// The underlying reader.
    ///
    /// The geometry fallback reads its reply through this, outside the
    /// key path.
    pub const fn get_mut(&mut self) -> &mut R {
        &mut self.input
    }

    /// Block until one complete key is available and return it.
    ///
    /// Empty reads are retried, so this only returns on a real keypress.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Read`] if the reader fails with a non-transient
    /// error.
    pub fn read_key(&mut self) -> Result<LogicalKey, TermError> {
        let byte = loop {
            if let Some(b) = self.next_byte()? {
                break b;
            }
        };

        if byte != ESC {
            return Ok(LogicalKey::from_byte(byte));
        }
        self.read_sequence()
    }

    /// Decode the rest of an escape sequence. The ESC is already consumed.
    fn read_sequence(&mut self) -> Result<LogicalKey, TermError> {
        let Some(lead) = self.next_byte()? else {
            return Ok(LogicalKey::Escape);
        };
        let Some(second) = self.next_byte()? else {
            return Ok(LogicalKey::Escape);
        };

        let key = match (lead, second) {
            (b'[', digit) if digit.is_ascii_digit() => match self.next_byte()? {
                Some(b'~') => classify(Sequence::CsiTilde, digit),
                _ => LogicalKey::Escape,
            },
            (b'[', letter) => classify(Sequence::Csi, letter),
            (b'O', letter) => classify(Sequence::Ss3, letter),
            _ => LogicalKey::Escape,
        };

        if key == LogicalKey::Escape {
            tracing::trace!(lead, second, "unrecognised escape sequence");
        }
        Ok(key)
    }

    fn next_byte(&mut self) -> Result<Option<u8>, TermError> {
        read_byte(&mut self.input).map_err(TermError::Read)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
