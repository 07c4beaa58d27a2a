//! Diagnostics error types.

use thiserror::Error;

/// Errors reading the registration file.
///
/// The report never fails because of these; they become issues.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// The registration file exists but could not be read.
    #[error("failed to read registration file: {0}")]
    Io(#[from] std::io::Error),
    /// The registration file is not valid JSON.
    #[error("failed to parse registration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The registration file has an unexpected shape.
    #[error("invalid registration structure: {0}")]
    Registration(String),
}
