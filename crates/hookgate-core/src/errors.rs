//! Core error types.

use thiserror::Error;

/// Errors raised while persisting hook state to disk.
///
/// Hooks never surface these to the host. Callers log and drop them, since
/// persisted state is an optimization rather than a correctness dependency.
#[derive(Debug, Error)]
pub enum StateError {
    /// Reading or writing the state file failed.
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The state could not be encoded as JSON.
    #[error("state JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
