//! Diagnostics implementation.
//!
//! A [`DiagCtxt`] owns an [`Emitter`] and counts what went through it. Diagnostics are built with
//! [`DiagBuilder`] and must be emitted before they are dropped.

use crate::{SourceFile, Span};
use anstyle::{AnsiColor, Style};
use std::{fmt, sync::Arc};

mod builder;
pub use builder::DiagBuilder;

mod context;
pub use context::DiagCtxt;

mod emitter;
pub use emitter::{
    DynEmitter, Emitter, HumanEmitter, InMemoryEmitter, JsonEmitter, SilentEmitter,
};

/// Useful type to use with [`Result`] indicate that an error has already been reported to the user,
/// so no need to continue checking.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ErrorGuaranteed(());

/// The severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    /// An error in the code being checked.
    Error,
    /// A warning about the code being checked.
    Warning,
    /// A message giving additional context.
    Note,
    /// A message suggesting how to fix something.
    Help,
}

impl Level {
    /// Returns the string representation of the level.
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Help => "help",
        }
    }

    /// Returns whether this level is an error.
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns the style used to render this level.
    pub const fn style(self) -> Style {
        let color = match self {
            Self::Error => AnsiColor::BrightRed,
            Self::Warning => AnsiColor::BrightYellow,
            Self::Note => AnsiColor::BrightGreen,
            Self::Help => AnsiColor::BrightCyan,
        };
        color.on_default().bold()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A source location attached to a diagnostic.
#[derive(Clone, Debug)]
pub struct DiagSpan {
    pub file: Arc<SourceFile>,
    pub span: Span,
    /// Text printed next to the underline.
    pub label: Option<String>,
}

/// A "sub"-diagnostic attached to a parent diagnostic.
/// For example, a note attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubDiagnostic {
    pub level: Level,
    pub message: String,
}

/// A diagnostic message, with an optional primary location and attached notes.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub code: Option<&'static str>,
    pub span: Option<DiagSpan>,
    pub children: Vec<SubDiagnostic>,
}

impl Diagnostic {
    /// Creates a new diagnostic without a location.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), code: None, span: None, children: Vec::new() }
    }

    /// Returns `true` if this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.level.is_error()
    }

    /// Returns the 1-based line and column of the primary location, if any.
    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.span.as_ref().map(|s| {
            let (line, col) = s.file.lookup_line_col(s.span.lo());
            (line, col.to_usize() + 1)
        })
    }
}
