use super::{DiagCtxt, DiagSpan, Diagnostic, ErrorGuaranteed, Level, SubDiagnostic};
use crate::{SourceFile, Span};
use std::sync::Arc;

/// Used for emitting structured error messages and other diagnostic information.
///
/// **Note:** Incorrect usage of this type results in a panic when dropped.
/// This is to ensure that all errors are either emitted or cancelled.
#[must_use = "diagnostics must be emitted or cancelled"]
pub struct DiagBuilder<'a> {
    dcx: &'a DiagCtxt,
    diagnostic: Option<Box<Diagnostic>>,
}

impl<'a> DiagBuilder<'a> {
    /// Creates a new builder.
    #[track_caller]
    pub fn new(dcx: &'a DiagCtxt, level: Level, message: impl Into<String>) -> Self {
        Self { dcx, diagnostic: Some(Box::new(Diagnostic::new(level, message))) }
    }

    fn diag(&mut self) -> &mut Diagnostic {
        self.diagnostic.as_mut().expect("diagnostic already emitted")
    }

    /// Sets the primary location.
    pub fn span(mut self, file: &Arc<SourceFile>, span: Span) -> Self {
        self.diag().span = Some(DiagSpan { file: file.clone(), span, label: None });
        self
    }

    /// Sets the primary location and the label printed under it.
    pub fn span_label(mut self, file: &Arc<SourceFile>, span: Span, label: impl Into<String>) -> Self {
        self.diag().span = Some(DiagSpan { file: file.clone(), span, label: Some(label.into()) });
        self
    }

    /// Sets the diagnostic code.
    pub fn code(mut self, code: &'static str) -> Self {
        self.diag().code = Some(code);
        self
    }

    /// Attaches a note.
    pub fn note(mut self, message: impl Into<String>) -> Self {
        self.diag().children.push(SubDiagnostic { level: Level::Note, message: message.into() });
        self
    }

    /// Attaches a help message.
    pub fn help(mut self, message: impl Into<String>) -> Self {
        self.diag().children.push(SubDiagnostic { level: Level::Help, message: message.into() });
        self
    }

    /// Emits the diagnostic. Returns a guarantee if it was an error.
    pub fn emit(mut self) -> Option<ErrorGuaranteed> {
        let diagnostic = self.diagnostic.take()?;
        self.dcx.emit_diagnostic(*diagnostic)
    }

    /// Drops the diagnostic without emitting it.
    pub fn cancel(mut self) {
        self.diagnostic = None;
    }
}

impl Drop for DiagBuilder<'_> {
    fn drop(&mut self) {
        if let Some(diagnostic) = self.diagnostic.take()
            && !std::thread::panicking()
        {
            // Don't lose it; surface the bug in debug builds.
            debug_assert!(false, "diagnostic was constructed but not emitted: {diagnostic:?}");
            self.dcx.emit_diagnostic(*diagnostic);
        }
    }
}
