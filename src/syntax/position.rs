use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a source file within one [`PositionTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub u32);

/// A point in the concatenation of all input files.
///
/// Field order is significant: the derived ordering compares file, then
/// row, then column, which is exactly source-encounter order. Rows and
/// columns are 1-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub file: u32,
    pub row: u32,
    pub column: u32,
}

impl Position {
    pub fn new(file: u32, row: u32, column: u32) -> Self {
        Self { file, row, column }
    }

    pub fn file_id(&self) -> FileId {
        FileId(self.file)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.column)
    }
}

/// A position resolved back to its file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub file: FileId,
    pub path: &'a str,
    pub row: u32,
    pub column: u32,
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.row, self.column)
    }
}

#[derive(Debug, Clone)]
struct SourceFile {
    path: String,
    // Furthest column reached on each row; index 0 is row 1.
    row_widths: Vec<u32>,
}

impl SourceFile {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            row_widths: vec![1],
        }
    }
}

/// Maps the lexer's progress to [`Position`] values.
///
/// The lexer reports column advances, line breaks and file switches; the
/// tracker hands out positions that are ordered by source encounter order
/// across every file of the session and can later be resolved back to
/// `path:row:column`.
///
/// Positions taken before the first [`advance_to_next_file`] belong to the
/// anonymous file `<input>` at index 0.
///
/// [`advance_to_next_file`]: PositionTracker::advance_to_next_file
#[derive(Debug, Clone)]
pub struct PositionTracker {
    files: Vec<SourceFile>,
    current: Position,
}

pub const ANONYMOUS_FILE: &str = "<input>";

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            files: vec![SourceFile::new(ANONYMOUS_FILE)],
            current: Position::new(0, 1, 1),
        }
    }

    /// Moves `delta` columns to the right on the current row.
    pub fn advance(&mut self, delta: u32) {
        if delta == 0 {
            return;
        }
        let column = self.current.column.saturating_add(delta);
        self.current.column = column;
        let width = self.current_row_width();
        *width = (*width).max(column);
    }

    /// Starts the next row at column 1.
    pub fn advance_to_next_row(&mut self) {
        self.current.row = self.current.row.saturating_add(1);
        self.current.column = 1;
        self.current_file_mut().row_widths.push(1);
    }

    /// Starts a new file at row 1, column 1 and returns its id.
    ///
    /// File ids grow monotonically and are never reused within a tracker.
    pub fn advance_to_next_file(&mut self, path: impl Into<String>) -> FileId {
        let index = u32::try_from(self.files.len())
            .unwrap_or_else(|_| panic!("internal inconsistency: too many source files"));
        self.files.push(SourceFile::new(path));
        self.current = Position::new(index, 1, 1);
        FileId(index)
    }

    /// The current position.
    pub fn snapshot(&self) -> Position {
        self.current
    }

    pub fn current_file(&self) -> FileId {
        self.current.file_id()
    }

    pub fn file_path(&self, file: FileId) -> Option<&str> {
        self.files.get(file.0 as usize).map(|f| f.path.as_str())
    }

    /// Number of files seen so far, including the anonymous file.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Resolves a position produced by this tracker.
    ///
    /// # Panics
    ///
    /// Panics if the position could not have been produced by this tracker;
    /// that is a bug in the caller, not bad input.
    pub fn resolve(&self, position: Position) -> Location<'_> {
        self.try_resolve(position).unwrap_or_else(|| {
            panic!(
                "internal inconsistency: position {} was not produced by this tracker",
                position
            )
        })
    }

    pub fn try_resolve(&self, position: Position) -> Option<Location<'_>> {
        let file = self.files.get(position.file as usize)?;
        let row_index = position.row.checked_sub(1)? as usize;
        let width = *file.row_widths.get(row_index)?;
        if position.column == 0 || position.column > width {
            return None;
        }
        Some(Location {
            file: position.file_id(),
            path: &file.path,
            row: position.row,
            column: position.column,
        })
    }

    fn current_file_mut(&mut self) -> &mut SourceFile {
        let index = self.current.file as usize;
        &mut self.files[index]
    }

    fn current_row_width(&mut self) -> &mut u32 {
        let row = self.current.row as usize - 1;
        &mut self.current_file_mut().row_widths[row]
    }
}
