use super::{
    DiagBuilder, Diagnostic, DynEmitter, ErrorGuaranteed, HumanEmitter, JsonEmitter, Level,
    SilentEmitter,
};
use parking_lot::Mutex;
use solcst_config::{ColorChoice, ErrorFormat};

/// A handler deals with errors and other output.
///
/// Counts what it emits so that the caller can decide the exit status afterwards.
pub struct DiagCtxt {
    inner: Mutex<DiagCtxtInner>,
}

struct DiagCtxtInner {
    emitter: Box<DynEmitter>,

    /// The number of errors that have been emitted.
    err_count: usize,
    /// The number of warnings that have been emitted.
    warn_count: usize,

    can_emit_warnings: bool,
}

impl DiagCtxt {
    /// Creates a new `DiagCtxt` with the given diagnostics emitter.
    pub fn new(emitter: Box<DynEmitter>) -> Self {
        Self {
            inner: Mutex::new(DiagCtxtInner {
                emitter,
                err_count: 0,
                warn_count: 0,
                can_emit_warnings: true,
            }),
        }
    }

    /// Creates a new `DiagCtxt` writing human-readable diagnostics to stderr.
    pub fn with_stderr_emitter(color: ColorChoice) -> Self {
        Self::new(Box::new(HumanEmitter::stderr(color)))
    }

    /// Creates a new `DiagCtxt` that only counts diagnostics.
    pub fn with_silent_emitter() -> Self {
        Self::new(Box::new(SilentEmitter::new()))
    }

    /// Creates a new `DiagCtxt` for the given output format.
    pub fn from_format(format: ErrorFormat, color: ColorChoice) -> Self {
        match format {
            ErrorFormat::Human => Self::with_stderr_emitter(color),
            ErrorFormat::Json => Self::new(Box::new(JsonEmitter::new(Box::new(std::io::stderr())))),
        }
    }

    /// Disables emitting warnings.
    pub fn disable_warnings(mut self) -> Self {
        self.inner.get_mut().can_emit_warnings = false;
        self
    }

    /// Emits the given diagnostic with this context.
    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) -> Option<ErrorGuaranteed> {
        self.inner.lock().emit_diagnostic(&diagnostic)
    }

    /// Returns the number of errors that have been emitted.
    #[inline]
    pub fn err_count(&self) -> usize {
        self.inner.lock().err_count
    }

    /// Returns the number of warnings that have been emitted.
    #[inline]
    pub fn warn_count(&self) -> usize {
        self.inner.lock().warn_count
    }

    /// Returns `Err` if any errors have been emitted.
    pub fn has_errors(&self) -> Result<(), ErrorGuaranteed> {
        if self.inner.lock().err_count > 0 { Err(ErrorGuaranteed(())) } else { Ok(()) }
    }

    /// Emits a summary of the emitted errors and warnings, if any.
    pub fn print_error_count(&self) {
        let (errors, warnings) = {
            let inner = self.inner.lock();
            (inner.err_count, inner.warn_count)
        };
        let warnings = match warnings {
            0 => String::new(),
            n => format!("; {n} warning{} emitted", pluralize!(n)),
        };
        if errors > 0 {
            let msg = format!("aborting due to {errors} previous error{}{warnings}", pluralize!(errors));
            self.inner.lock().emitter_mut().emit_diagnostic(&Diagnostic::new(Level::Error, msg));
        } else if !warnings.is_empty() {
            let msg = warnings.trim_start_matches("; ").to_string();
            self.inner.lock().emitter_mut().emit_diagnostic(&Diagnostic::new(Level::Warning, msg));
        }
    }
}

/// Diagnostic constructors.
///
/// Note that methods returning a [`DiagBuilder`] must also marked with `#[track_caller]`.
impl DiagCtxt {
    /// Creates a builder at the given `level` with the given `message`.
    #[track_caller]
    pub fn diag(&self, level: Level, message: impl Into<String>) -> DiagBuilder<'_> {
        DiagBuilder::new(self, level, message)
    }

    /// Creates a builder at the `Error` level with the given `message`.
    #[track_caller]
    pub fn err(&self, message: impl Into<String>) -> DiagBuilder<'_> {
        self.diag(Level::Error, message)
    }

    /// Creates a builder at the `Warning` level with the given `message`.
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) -> DiagBuilder<'_> {
        self.diag(Level::Warning, message)
    }

    /// Creates a builder at the `Note` level with the given `message`.
    #[track_caller]
    pub fn note(&self, message: impl Into<String>) -> DiagBuilder<'_> {
        self.diag(Level::Note, message)
    }
}

impl DiagCtxtInner {
    fn emitter_mut(&mut self) -> &mut DynEmitter {
        &mut *self.emitter
    }

    fn emit_diagnostic(&mut self, diagnostic: &Diagnostic) -> Option<ErrorGuaranteed> {
        match diagnostic.level {
            Level::Warning if !self.can_emit_warnings => return None,
            Level::Warning => self.warn_count += 1,
            Level::Error => self.err_count += 1,
            Level::Note | Level::Help => {}
        }
        trace!(level = %diagnostic.level, message = %diagnostic.message, "emitting diagnostic");
        self.emitter.emit_diagnostic(diagnostic);
        diagnostic.is_error().then_some(ErrorGuaranteed(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::InMemoryEmitter;

    #[test]
    fn counts() {
        let (emitter, buffer) = InMemoryEmitter::new();
        let dcx = DiagCtxt::new(Box::new(emitter));
        assert!(dcx.has_errors().is_ok());
        assert!(dcx.warn("w").emit().is_none());
        assert!(dcx.err("e").note("n").emit().is_some());
        dcx.note("just so you know").emit();
        assert_eq!(dcx.err_count(), 1);
        assert_eq!(dcx.warn_count(), 1);
        assert!(dcx.has_errors().is_err());

        let emitted = buffer.lock();
        assert_eq!(emitted.len(), 3);
        assert_eq!(emitted[1].message, "e");
        assert_eq!(emitted[1].children.len(), 1);
    }

    #[test]
    fn disabled_warnings() {
        let (emitter, buffer) = InMemoryEmitter::new();
        let dcx = DiagCtxt::new(Box::new(emitter)).disable_warnings();
        dcx.warn("w").emit();
        assert_eq!(dcx.warn_count(), 0);
        assert!(buffer.lock().is_empty());
    }

    #[test]
    fn error_count_summary() {
        let (emitter, buffer) = InMemoryEmitter::new();
        let dcx = DiagCtxt::new(Box::new(emitter));
        dcx.err("a").emit();
        dcx.err("b").emit();
        dcx.warn("c").emit();
        dcx.print_error_count();
        let emitted = buffer.lock();
        assert_eq!(
            emitted.last().unwrap().message,
            "aborting due to 2 previous errors; 1 warning emitted"
        );
        // The summary itself is not counted.
        drop(emitted);
        assert_eq!(dcx.err_count(), 2);
    }
}
