// src/logging.rs

//! Logging for `stepdag` using `tracing` + `tracing-subscriber`.
//!
//! Two layers:
//!
//! - [`LogSink`] is the sink injected into steps and the executor. Callers
//!   can provide their own implementation; [`TracingSink`] forwards to
//!   `tracing` and is the default.
//! - Internal diagnostics use `tracing` events directly. [`init_logging`]
//!   installs a global subscriber, resolving the level from the argument,
//!   the `STEPDAG_LOG` environment variable, or `info`, in that order.
//!
//! Logs are sent to STDERR so that step stdout stays untouched.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::fmt;

/// Five-severity message sink handed to steps and used by the executor for
/// run/skip announcements.
pub trait LogSink: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn notice(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Shared handle to a [`LogSink`].
pub type Logger = Arc<dyn LogSink>;

/// Default sink: forwards every message to `tracing`.
///
/// `notice` has no `tracing` level of its own; it maps to `info` with a
/// `notice` field so subscribers can still tell the severities apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn notice(&self, message: &str) {
        tracing::info!(notice = true, "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// The logger used when the caller does not inject one.
pub fn default_logger() -> Logger {
    Arc::new(TracingSink)
}

/// Initialise the global tracing subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(level: Option<tracing::Level>) -> Result<()> {
    let level = match level {
        Some(lvl) => lvl,
        None => std::env::var("STEPDAG_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    // Send logs to stderr; keep stdout free for step output.
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
