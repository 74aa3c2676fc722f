// SPDX-License-Identifier: MIT
//
// ewis-term — Terminal layer for the ewis editor.
//
// Everything ewis knows about the terminal lives here: entering and
// leaving raw mode, finding out how big the screen is, turning the raw
// input byte stream into keys, and handing each frame to the terminal in
// a single write.
//
// No TUI framework (crossterm, termion) sits underneath. ewis speaks a
// small VT100 subset directly and drives termios through libc, so every
// byte sent to or read from the terminal is accounted for here.

pub mod ansi;
pub mod error;
pub mod geometry;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{CursorPositionError, TermError};
pub use geometry::ScreenSize;
pub use input::{KeyDecoder, LogicalKey, ctrl_key};
pub use output::RenderBuffer;
pub use terminal::{Discipline, RawMode};
