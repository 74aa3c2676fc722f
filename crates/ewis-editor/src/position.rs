//! Document coordinates.
//!
//! All coordinates are **0-indexed** and count bytes: ewis treats text as
//! single-byte characters. `y` is the line, `x` the column within it.
//!
//! A [`Position`] is where the cursor is in the document. A [`ScrollOffset`]
//! is the document coordinate shown at the top-left of the screen, with `x`
//! measured in *rendered* columns (tabs expanded).
//!
//! The status bar converts to 1-indexed for the user; that conversion never
//! belongs here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cursor position in a document: (column, line), both 0-indexed.
///
/// `y` may equal the number of lines (one past the end), which is where a
/// character typed into an empty document or below the last line goes.
///
/// # Ordering
///
/// Positions are ordered line first, then column.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// The origin: line 0, column 0.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.y, self.x)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.y + 1, self.x + 1)
    }
}

// ---------------------------------------------------------------------------
// ScrollOffset
// ---------------------------------------------------------------------------

/// The top-left visible document coordinate.
///
/// `y` is a line index, `x` a rendered column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScrollOffset {
    pub x: usize,
    pub y: usize,
}

impl ScrollOffset {
    /// No scrolling.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_line_first() {
        assert!(Position::new(9, 0) < Position::new(0, 1));
        assert!(Position::new(1, 3) < Position::new(2, 3));
        assert_eq!(Position::new(4, 4).cmp(&Position::new(4, 4)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn display_is_one_indexed() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(Position::new(7, 41).to_string(), "42:8");
    }

    #[test]
    fn debug_is_compact() {
        assert_eq!(format!("{:?}", Position::new(3, 2)), "Pos(2:3)");
    }

    #[test]
    fn zero_is_default() {
        assert_eq!(Position::default(), Position::ZERO);
        assert_eq!(ScrollOffset::default(), ScrollOffset::ZERO);
    }
}
