//! # ewis-editor — Editor core for ewis
//!
//! Everything between the terminal layer (`ewis-term`) and the binary:
//!
//! - **[`position`]** — `Position` (column, line) and `ScrollOffset`, 0-indexed
//! - **[`document`]** — the lines being edited, loaded from disk, each with a
//!   tab-expanded render form
//! - **[`viewport`]** — rendered columns and the minimal-scroll offset
//! - **[`message`]** — the timed status message
//! - **[`options`]** — tab width, message timeout, quit key
//! - **[`editor`]** — cursor movement, insertion, and frame drawing
//! - **[`session`]** — the raw-mode frame loop
//!
//! Nothing here saves to disk.

pub mod document;
pub mod editor;
pub mod error;
pub mod message;
pub mod options;
pub mod position;
pub mod session;
pub mod viewport;

pub use editor::{Action, Editor};
pub use error::EditorError;
pub use options::Options;
pub use session::Session;
