//! Bounded stdin reads and decision output.
//!
//! The host may hold stdin open or never write to it. Reads happen on a
//! detached thread so the caller can give up after a deadline; the thread
//! dies with the process.

use std::io::{Read, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::types::HookDecision;

/// Read all of stdin, waiting at most `timeout`.
///
/// Returns an empty string on timeout or read failure, which decodes as a
/// malformed (maximally permissive) event.
pub fn read_stdin_bounded(timeout: Duration) -> String {
    read_bounded(std::io::stdin(), timeout)
}

/// Read `reader` to the end on a helper thread, waiting at most `timeout`.
pub fn read_bounded<R>(mut reader: R, timeout: Duration) -> String
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("hook-input".into())
        .spawn(move || {
            let mut buf = Vec::new();
            let result = reader.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        });

    if let Err(e) = spawned {
        warn!(error = %e, "failed to spawn input reader");
        return String::new();
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(bytes)) => {
            debug!(bytes = bytes.len(), "hook input read");
            String::from_utf8_lossy(&bytes).into_owned()
        }
        Ok(Err(e)) => {
            debug!(error = %e, "hook input read failed");
            String::new()
        }
        Err(RecvTimeoutError::Timeout) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(timeout_ms, "hook input read timed out");
            String::new()
        }
        Err(RecvTimeoutError::Disconnected) => String::new(),
    }
}

/// Write one decision as a single JSON line.
pub fn write_decision<W: Write>(mut writer: W, decision: &HookDecision) -> std::io::Result<()> {
    serde_json::to_writer(&mut writer, decision)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Write one decision to stdout. Failures are logged, never raised.
pub fn emit_decision(decision: &HookDecision) {
    let stdout = std::io::stdout();
    if let Err(e) = write_decision(stdout.lock(), decision) {
        warn!(error = %e, "failed to write hook decision");
    }
}
