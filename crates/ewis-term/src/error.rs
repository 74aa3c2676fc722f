// SPDX-License-Identifier: MIT
//
// Error types for terminal control.
//
// Every failure here means the environment cannot host the editor: stdin
// is not a terminal, the emulator does not answer the cursor position
// query, or a termios call was rejected. Callers do not retry; they
// restore what they can and exit.

use std::io;

/// Failure to obtain a usable reply to the `ESC[6n` cursor position query.
#[derive(Debug, thiserror::Error)]
pub enum CursorPositionError {
    /// Writing the probe or the query sequence failed.
    #[error("failed to send cursor position query: {0}")]
    Query(#[source] io::Error),

    /// Reading the reply from the input stream failed.
    #[error("failed to read cursor position reply: {0}")]
    Read(#[source] io::Error),

    /// The reply did not have the shape `ESC [ rows ; cols R`.
    ///
    /// Carries the reply bytes, escaped for printing.
    #[error("malformed cursor position reply \"{0}\"")]
    Malformed(String),
}

impl CursorPositionError {
    /// Build a [`Malformed`](Self::Malformed) error from raw reply bytes.
    #[must_use]
    pub fn malformed(reply: &[u8]) -> Self {
        Self::Malformed(reply.escape_ascii().to_string())
    }
}

/// Errors raised by the terminal layer.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    /// `tcgetattr` / `tcsetattr` was rejected.
    #[error("{call} failed: {source}")]
    TerminalAttribute {
        /// The libc call that failed.
        call: &'static str,
        #[source]
        source: io::Error,
    },

    /// Neither the window size ioctl nor the escape-sequence fallback
    /// produced a screen size.
    #[error("could not determine window size: {0}")]
    Geometry(#[source] CursorPositionError),

    /// Reading a key from the terminal failed.
    #[error("read from terminal failed: {0}")]
    Read(#[source] io::Error),

    /// Writing a frame to the terminal failed.
    #[error("write to terminal failed: {0}")]
    Write(#[source] io::Error),
}

/// Whether an I/O error just means "no byte available yet".
///
/// Raw mode is configured with a read timeout, so `EAGAIN` and `EINTR`
/// show up during normal operation and must not abort the editor.
#[must_use]
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
