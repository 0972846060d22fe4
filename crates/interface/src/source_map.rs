//! Source files and position lookup.

use crate::{BytePos, CharPos, Span};
use std::{
    fmt, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// The name of a source file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileName {
    /// A file on disk.
    Real(PathBuf),
    /// Source text that did not come from a file, e.g. standard input or a test string.
    Custom(String),
}

impl From<PathBuf> for FileName {
    fn from(p: PathBuf) -> Self {
        Self::Real(p)
    }
}

impl From<&Path> for FileName {
    fn from(p: &Path) -> Self {
        Self::Real(p.to_path_buf())
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(path) => path.display().fmt(f),
            Self::Custom(s) => write!(f, "<{s}>"),
        }
    }
}

/// A single source file: its name, its text and the byte offsets of its line starts.
pub struct SourceFile {
    /// The name of the file that the source came from.
    pub name: FileName,
    /// The complete source code.
    pub src: Arc<str>,
    /// Locations of lines beginnings in the source code.
    lines: Vec<BytePos>,
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("len", &self.src.len())
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl SourceFile {
    /// Creates a new source file.
    pub fn new(name: impl Into<FileName>, src: impl Into<Arc<str>>) -> Self {
        let src = src.into();
        let lines = std::iter::once(BytePos(0))
            .chain(memchr::memchr_iter(b'\n', src.as_bytes()).map(|i| BytePos::from_usize(i + 1)))
            .collect();
        Self { name: name.into(), src, lines }
    }

    /// Reads a source file from disk.
    pub fn read(path: &Path) -> io::Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Ok(Self::new(path, src))
    }

    /// Returns the byte offsets of the line beginnings.
    pub fn lines(&self) -> &[BytePos] {
        &self.lines
    }

    /// Returns the number of lines.
    pub fn count_lines(&self) -> usize {
        self.lines.len()
    }

    /// Finds the line containing the given position. The return value is the index into the
    /// `lines` array of this `SourceFile`, not the 1-based line number.
    pub fn lookup_line(&self, pos: BytePos) -> Option<usize> {
        self.lines.partition_point(|x| x <= &pos).checked_sub(1)
    }

    /// Looks up the 1-based line number and 0-based character column of a byte position.
    pub fn lookup_line_col(&self, pos: BytePos) -> (usize, CharPos) {
        let Some(line) = self.lookup_line(pos) else { return (0, CharPos(0)) };
        let start = self.lines[line].to_usize();
        let end = pos.to_usize().min(self.src.len());
        let col = self.src.get(start..end).map_or(end - start, |s| s.chars().count());
        (line + 1, CharPos::from_usize(col))
    }

    /// Gets the text of the given 0-based line, without the newline terminator.
    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        let start = self.lines.get(line_number)?.to_usize();
        let rest = &self.src[start..];
        let end = memchr::memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
        Some(rest[..end].trim_end_matches('\r'))
    }

    /// Returns the source text covered by `span`, if it is in bounds.
    pub fn span_to_snippet(&self, span: Span) -> Option<&str> {
        self.src.get(span.to_range())
    }

    /// Formats `span` as `name:line:col`, using 1-based columns as editors do.
    pub fn span_to_diagnostic_string(&self, span: Span) -> String {
        let (line, col) = self.lookup_line_col(span.lo());
        format!("{}:{line}:{}", self.name, col.0 + 1)
    }
}
