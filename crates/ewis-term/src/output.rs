// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// Everything the editor draws in a frame (text, filler, status bar, cursor
// moves) goes into a `RenderBuffer` first. At frame end one `write()` hands
// the whole frame to the terminal. Many small writes during a redraw let
// the terminal paint half-finished frames; one write per frame does not.

use std::io::{self, Write};

/// Default capacity: 16 KB, enough for a full frame of a large terminal
/// without reallocating.
const DEFAULT_CAPACITY: usize = 16_384;

/// A byte buffer that accumulates one frame for a single `write()` call.
///
/// Text and control sequences are appended in drawing order. The buffer
/// implements [`Write`], so the [`ansi`](crate::ansi) helpers can target
/// it directly.
#[derive(Debug)]
pub struct RenderBuffer {
    buf: Vec<u8>,
}

impl RenderBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw text or an already-encoded control sequence.
    #[inline]
    pub fn append(&mut self, bytes: impl AsRef<[u8]>) {
        self.buf.extend_from_slice(bytes.as_ref());
    }

    /// Append `n` copies of `byte` (status bar padding, tab expansion).
    pub fn append_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Discard the accumulated bytes, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hand the whole frame to `w` in exactly one `write()` call.
    ///
    /// The buffer is cleared whatever the outcome. Returns `Ok(true)` when
    /// the writer accepted every byte, `Ok(false)` on a short write.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the following flush fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<bool> {
        if self.buf.is_empty() {
            return Ok(true);
        }
        let result = w.write(&self.buf);
        let expected = self.buf.len();
        self.buf.clear();
        let written = result?;
        w.flush()?;
        Ok(written == expected)
    }
}

impl Write for RenderBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. Frames reach the terminal through flush_to().
        Ok(())
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
