//! Editor-level errors.
//!
//! Terminal failures pass through unchanged; the only thing the editor adds
//! on its own is failing to read the file it was asked to open.

use std::io;
use std::path::PathBuf;

use ewis_term::TermError;

/// Errors that end an editing session.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The terminal could not be driven (raw mode, geometry, I/O).
    #[error(transparent)]
    Terminal(#[from] TermError),

    /// The file to edit exists but could not be read.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
