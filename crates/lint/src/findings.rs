use std::fmt::{self, Write};

/// The findings of one listener over one file: plain-text lines, in the order they were found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Findings {
    file: String,
    text: String,
}

impl Findings {
    /// Creates an empty buffer for `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into(), text: String::new() }
    }

    /// The name of the file the findings are about.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Appends one line.
    pub fn push(&mut self, line: impl fmt::Display) {
        let _ = writeln!(self.text, "{line}");
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.text.lines().count()
    }

    /// Drains the buffer.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

impl fmt::Display for Findings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
