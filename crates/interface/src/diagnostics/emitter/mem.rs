use crate::diagnostics::{Diagnostic, Emitter};
use parking_lot::Mutex;
use std::sync::Arc;

/// An in-memory diagnostics emitter.
///
/// Diagnostics are pushed to a shared buffer as-is.
///
/// # Warning
///
/// Do **NOT** hold the buffer lock while emitting, the emitter needs it to push.
pub struct InMemoryEmitter {
    buffer: Arc<Mutex<Vec<Diagnostic>>>,
}

impl InMemoryEmitter {
    /// Creates a new emitter, returning the emitter itself and the buffer.
    pub fn new() -> (Self, Arc<Mutex<Vec<Diagnostic>>>) {
        let buffer = Arc::<Mutex<Vec<Diagnostic>>>::default();
        (Self { buffer: Arc::clone(&buffer) }, buffer)
    }
}

impl Emitter for InMemoryEmitter {
    fn emit_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.buffer.lock().push(diagnostic.clone());
    }
}
