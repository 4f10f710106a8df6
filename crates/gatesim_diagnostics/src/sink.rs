//! Error-counting diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Forward = Box<dyn Fn(&Diagnostic) + Send + Sync>;

/// Accumulates diagnostics and counts errors.
///
/// Every emitted diagnostic is stored and, if a callback was installed with
/// [`with_callback`](Self::with_callback), forwarded to it immediately. Only
/// [`Severity::Error`](crate::Severity::Error) diagnostics bump the error
/// count, so warnings and notes never make a chip unusable.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
    forward: Option<Forward>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
            forward: None,
        }
    }

    /// Creates a sink that also hands each diagnostic to `callback` as it is emitted.
    pub fn with_callback(callback: impl Fn(&Diagnostic) + Send + Sync + 'static) -> Self {
        Self {
            forward: Some(Box::new(callback)),
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(forward) = &self.forward {
            forward(&diag);
        }
        self.lock().push(diag);
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    ///
    /// The error count is not reset.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Returns how many stored diagnostics have exactly this message.
    pub fn count_message(&self, message: &str) -> usize {
        self.lock().iter().filter(|d| d.message == message).count()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use gatesim_source::Span;
    use std::sync::Arc;

    fn make_error() -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::new(Category::Error, 200),
            "Chip `Foo` not found",
            Span::DUMMY,
        )
    }

    fn make_warning() -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 201),
            "output pin `out` is never driven",
            Span::DUMMY,
        )
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn warnings_do_not_count() {
        let sink = DiagnosticSink::new();
        sink.emit(make_warning());
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 1);
        sink.emit(make_error());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn take_all_keeps_error_count() {
        let sink = DiagnosticSink::new();
        sink.emit(make_error());
        sink.emit(make_warning());
        assert_eq!(sink.take_all().len(), 2);
        assert!(sink.take_all().is_empty());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn callback_sees_every_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = Arc::clone(&seen);
        let sink = DiagnosticSink::with_callback(move |d| {
            seen_in_cb.lock().unwrap().push(d.message.clone());
        });
        sink.emit(make_error());
        sink.emit(make_warning());
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec!["Chip `Foo` not found", "output pin `out` is never driven"]
        );
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn count_message_matches_exactly() {
        let sink = DiagnosticSink::new();
        sink.emit(make_error());
        sink.emit(make_error());
        assert_eq!(sink.count_message("Chip `Foo` not found"), 2);
        assert_eq!(sink.count_message("Chip `Bar` not found"), 0);
    }

    #[test]
    fn emit_from_many_threads() {
        let sink = Arc::new(DiagnosticSink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        sink.emit(make_error());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.error_count(), 400);
        assert_eq!(sink.diagnostics().len(), 400);
    }
}
