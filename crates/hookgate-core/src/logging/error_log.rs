//! Append-only error log transport for `tracing` events.
//!
//! [`ErrorLogLayer`] implements [`tracing_subscriber::Layer`] and appends
//! `ERROR` events to a plain-text log, one line each:
//!
//! ```text
//! [2026-01-01T00:00:00.000Z] hookgate_hooks::phase_gate: state file unreadable reason="..."
//! ```
//!
//! The diagnostics report reads the same file. Write failures are ignored.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// `tracing` layer appending `ERROR` events to a log file.
pub struct ErrorLogLayer {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ErrorLogLayer {
    /// Log `ERROR` events to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn append(&self, line: &str) {
        let _guard = match self.write_lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path);
        if let Ok(mut file) = file {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Collects the message and remaining fields of an event.
#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: &str) {
        let _ = write!(self.fields, " {name}={value}");
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push_field(field.name(), &format!("{value:?}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.push_field(field.name(), &format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for ErrorLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        // More verbose levels compare greater.
        if *event.metadata().level() > Level::ERROR {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let message = visitor.message.unwrap_or_default();
        let line = format!(
            "[{timestamp}] {}: {}{}\n",
            event.metadata().target(),
            message.replace('\n', " "),
            visitor.fields.replace('\n', " "),
        );
        self.append(&line);
    }
}
