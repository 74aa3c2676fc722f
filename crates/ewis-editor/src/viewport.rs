//! Viewport — which part of the document is on screen.
//!
//! Two pure functions:
//!
//! - [`rendered_x`] maps a byte column to the on-screen column, expanding
//!   tabs to the next tab stop.
//! - [`compute_offset`] scrolls the previous offset by the least amount
//!   that brings the cursor back inside the text area.
//!
//! The axes are independent: the vertical offset follows the cursor line,
//! the horizontal offset follows the rendered cursor column, and neither
//! looks at the other.

use ewis_term::ScreenSize;

use crate::position::{Position, ScrollOffset};

// ---------------------------------------------------------------------------
// Rendered columns
// ---------------------------------------------------------------------------

/// Convert a byte column to a rendered column.
///
/// Walks `line` up to `cx`. A tab advances to the next multiple of
/// `tab_stop`; every other byte advances by one. Columns past the end of
/// the line count as one column each, so the cursor may sit just after the
/// last character.
///
/// ```
/// use ewis_editor::viewport::rendered_x;
///
/// assert_eq!(rendered_x(b"a\tb", 2, 4), 4);
/// ```
#[must_use]
pub fn rendered_x(line: &[u8], cx: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    let mut rx = 0;
    for &byte in line.iter().take(cx) {
        if byte == b'\t' {
            rx = (rx / tab_stop + 1) * tab_stop;
        } else {
            rx += 1;
        }
    }
    rx + cx.saturating_sub(line.len())
}

// ---------------------------------------------------------------------------
// Scrolling
// ---------------------------------------------------------------------------

/// Scroll `prev` just enough that the cursor is visible in `area`.
///
/// On each axis the offset is pulled back to the cursor if the cursor is
/// above / left of it, and pushed forward to `cursor − size + 1` if the
/// cursor is at or past the far edge. Otherwise it stays put.
///
/// `rx` is the cursor's rendered column (see [`rendered_x`]); `area` is the
/// text area, not the whole screen.
#[must_use]
pub fn compute_offset(cursor: Position, rx: usize, area: ScreenSize, prev: ScrollOffset) -> ScrollOffset {
    ScrollOffset {
        x: follow(prev.x, rx, usize::from(area.cols)),
        y: follow(prev.y, cursor.y, usize::from(area.rows)),
    }
}

/// One axis of [`compute_offset`]. `extent` is at least 1.
#[inline]
fn follow(prev: usize, at: usize, extent: usize) -> usize {
    let start = prev.min(at);
    if at >= start + extent {
        at + 1 - extent
    } else {
        start
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
