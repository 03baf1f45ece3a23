//! Caller-owned diagnostic sinks.
//!
//! Extraction degrades gracefully on malformed input: anything it recovers
//! from is reported through a `DiagnosticSink` handed to the component at
//! construction time, so the caller owns the logging lifecycle instead of a
//! process-wide logger configured at startup.

use std::cell::RefCell;

/// Receiver for non-fatal diagnostics emitted during extraction.
pub trait DiagnosticSink {
    fn warn(&self, message: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }
}

/// Captures diagnostics in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: RefCell<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
