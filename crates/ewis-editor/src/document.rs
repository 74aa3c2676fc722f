//! Document — the lines being edited.
//!
//! A [`Document`] is an ordered list of [`Row`]s plus the path it came
//! from. Text is bytes: ewis does not decode UTF-8, and a column is a byte
//! index.
//!
//! Each row keeps two forms:
//!
//! - `chars`: the bytes as they are in the file
//! - `render`: the same bytes with tabs expanded to spaces, which is what
//!   gets drawn
//!
//! `render` is rebuilt whenever `chars` changes, so drawing a frame never
//! expands tabs.
//!
//! # Loading
//!
//! The file is split on `\n`. A `\r` right before the `\n` is dropped, so
//! CRLF files show no stray control bytes. A final newline ends the last
//! line rather than starting an empty one. A file that does not exist yet
//! opens as an empty document that remembers its path.
//!
//! Nothing is ever written back to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::EditorError;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the document, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    /// Build a row and its rendered form.
    #[must_use]
    pub fn new(chars: Vec<u8>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars,
            render: Vec::new(),
        };
        row.update_render(tab_stop);
        row
    }

    /// The raw bytes.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The bytes as drawn, tabs expanded.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Length in bytes (= logical columns).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Insert `byte` at column `at`, or at the end if `at` is past it.
    pub fn insert(&mut self, at: usize, byte: u8, tab_stop: usize) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.update_render(tab_stop);
    }

    /// Rebuild `render` from `chars`.
    fn update_render(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        self.render.clear();
        for &byte in &self.chars {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The lines of the file being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    rows: Vec<Row>,
    path: Option<PathBuf>,
    tab_stop: usize,
}

impl Document {
    /// An empty, unnamed document.
    #[must_use]
    pub fn empty(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            path: None,
            tab_stop: tab_stop.max(1),
        }
    }

    /// Split `bytes` into rows (see the module docs for the rules).
    #[must_use]
    pub fn from_bytes(bytes: &[u8], tab_stop: usize) -> Self {
        let mut doc = Self::empty(tab_stop);
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        if bytes.is_empty() {
            return doc;
        }
        doc.rows = body
            .split(|&b| b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                Row::new(line.to_vec(), doc.tab_stop)
            })
            .collect();
        doc
    }

    /// Load the file at `path`.
    ///
    /// A missing file is not an error: it opens as an empty document named
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Open`] if the file exists but can't be read.
    pub fn open(path: &Path, tab_stop: usize) -> Result<Self, EditorError> {
        let mut doc = match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes, tab_stop),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                Self::empty(tab_stop)
            }
            Err(source) => {
                return Err(EditorError::Open {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        doc.path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), lines = doc.len(), "opened");
        Ok(doc)
    }

    // -- Access -------------------------------------------------------------

    /// Number of lines.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at line `y`, if there is one.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&Row> {
        self.rows.get(y)
    }

    /// Length of line `y`; 0 past the end.
    #[must_use]
    pub fn line_len(&self, y: usize) -> usize {
        self.row(y).map_or(0, Row::len)
    }

    /// Tab width used for the rendered form.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Where the document was loaded from.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Name shown in the status bar: the path as given, or `None`.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.display().to_string())
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `byte` at `at`.
    ///
    /// When `at.y` is one past the last line, an empty line is appended
    /// first. Any other out-of-range line is ignored.
    pub fn insert_char(&mut self, at: Position, byte: u8) {
        if at.y == self.rows.len() {
            self.rows.push(Row::new(Vec::new(), self.tab_stop));
        }
        let tab_stop = self.tab_stop;
        if let Some(row) = self.rows.get_mut(at.y) {
            row.insert(at.x, byte, tab_stop);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn lines(doc: &Document) -> Vec<&[u8]> {
        (0..doc.len()).map(|y| doc.row(y).unwrap().chars()).collect()
    }

    // -- Row ----------------------------------------------------------------

    #[test]
    fn render_expands_tabs_to_stops() {
        let row = Row::new(b"a\tb".to_vec(), 4);
        assert_eq!(row.render(), b"a   b");
        let row = Row::new(b"\tx".to_vec(), 8);
        assert_eq!(row.render(), b"        x");
    }

    #[test]
    fn render_tab_on_a_stop_is_full_width() {
        let row = Row::new(b"abcd\te".to_vec(), 4);
        assert_eq!(row.render(), b"abcd    e");
    }

    #[test]
    fn insert_updates_render() {
        let mut row = Row::new(b"ab".to_vec(), 4);
        row.insert(1, b'\t', 4);
        assert_eq!(row.chars(), b"a\tb");
        assert_eq!(row.render(), b"a   b");
    }

    #[test]
    fn insert_past_end_appends() {
        let mut row = Row::new(b"ab".to_vec(), 4);
        row.insert(10, b'c', 4);
        assert_eq!(row.chars(), b"abc");
    }

    // -- Loading ------------------------------------------------------------

    #[test]
    fn from_bytes_splits_lines() {
        let doc = Document::from_bytes(b"one\ntwo\nthree", 4);
        assert_eq!(lines(&doc), [&b"one"[..], b"two", b"three"]);
    }

    #[test]
    fn final_newline_adds_no_line() {
        let doc = Document::from_bytes(b"one\ntwo\n", 4);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn blank_lines_survive() {
        let doc = Document::from_bytes(b"a\n\n\nb\n", 4);
        assert_eq!(lines(&doc), [&b"a"[..], b"", b"", b"b"]);
    }

    #[test]
    fn lone_newline_is_one_empty_line() {
        let doc = Document::from_bytes(b"\n", 4);
        assert_eq!(lines(&doc), [&b""[..]]);
    }

    #[test]
    fn crlf_is_stripped() {
        let doc = Document::from_bytes(b"one\r\ntwo\r\n", 4);
        assert_eq!(lines(&doc), [&b"one"[..], b"two"]);
    }

    #[test]
    fn empty_input_is_empty_document() {
        assert!(Document::from_bytes(b"", 4).is_empty());
    }

    #[test]
    fn open_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"fn main() {\n\tloop {}\n}\n").unwrap();

        let doc = Document::open(file.path(), 4).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.row(1).unwrap().render(), b"    loop {}");
        assert_eq!(doc.path(), Some(file.path()));
    }

    #[test]
    fn open_missing_file_is_empty_and_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let doc = Document::open(&path, 4).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.path(), Some(path.as_path()));
    }

    #[test]
    fn open_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(dir.path(), 4).unwrap_err();
        assert!(matches!(err, EditorError::Open { .. }));
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_into_empty_document_appends_line() {
        let mut doc = Document::empty(4);
        doc.insert_char(Position::ZERO, b'x');
        assert_eq!(lines(&doc), [&b"x"[..]]);
    }

    #[test]
    fn insert_one_past_end_appends_line() {
        let mut doc = Document::from_bytes(b"a\n", 4);
        doc.insert_char(Position::new(0, 1), b'b');
        assert_eq!(lines(&doc), [&b"a"[..], b"b"]);
    }

    #[test]
    fn insert_far_past_end_is_ignored() {
        let mut doc = Document::from_bytes(b"a\n", 4);
        doc.insert_char(Position::new(0, 5), b'b');
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn insert_mid_line() {
        let mut doc = Document::from_bytes(b"held\n", 4);
        doc.insert_char(Position::new(3, 0), b'l');
        assert_eq!(doc.row(0).unwrap().chars(), b"helld");
    }

    #[test]
    fn line_len_past_end_is_zero() {
        let doc = Document::from_bytes(b"abc", 4);
        assert_eq!(doc.line_len(0), 3);
        assert_eq!(doc.line_len(1), 0);
    }
}
