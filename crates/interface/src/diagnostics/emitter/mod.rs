use super::Diagnostic;

mod human;
pub use human::HumanEmitter;

mod json;
pub use json::JsonEmitter;

mod mem;
pub use mem::InMemoryEmitter;

/// Dynamic diagnostic emitter. See [`Emitter`].
pub type DynEmitter = dyn Emitter + Send;

/// Diagnostic emitter.
pub trait Emitter {
    /// Emits a diagnostic.
    fn emit_diagnostic(&mut self, diagnostic: &Diagnostic);
}

/// Diagnostic emitter that only emits nothing. Counting still happens in the owning
/// [`DiagCtxt`](super::DiagCtxt).
#[derive(Debug, Default)]
pub struct SilentEmitter(());

impl SilentEmitter {
    /// Creates a new silent emitter.
    pub fn new() -> Self {
        Self(())
    }
}

impl Emitter for SilentEmitter {
    fn emit_diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

#[cold]
#[inline(never)]
fn io_panic(error: std::io::Error) -> ! {
    panic!("failed to emit diagnostic: {error}");
}
