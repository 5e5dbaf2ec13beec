use std::sync::{Arc, Mutex};

use stepdag::LogSink;

/// A log sink that records every message so tests can assert on executor
/// announcements.
#[derive(Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(severity, message)` pairs recorded so far.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Messages of one severity.
    pub fn messages_at(&self, severity: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, severity: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((severity.to_string(), message.to_string()));
    }
}

impl LogSink for MemorySink {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn notice(&self, message: &str) {
        self.push("notice", message);
    }

    fn warning(&self, message: &str) {
        self.push("warning", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}
