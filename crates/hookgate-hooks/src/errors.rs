//! Hook error types.

use thiserror::Error;

/// Errors that can occur while a hook computes its decision.
///
/// None of these reach the host: the runner logs them and allows the action.
#[derive(Debug, Error)]
pub enum HookError {
    /// Hook execution timed out.
    #[error("hook timed out after {timeout_ms}ms: {name}")]
    Timeout {
        /// Hook name that timed out.
        name: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The external recall collaborator failed.
    #[error("recall failed: {0}")]
    Recall(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display() {
        let err = HookError::Timeout {
            name: "plan-context".into(),
            timeout_ms: 5000,
        };
        assert_eq!(err.to_string(), "hook timed out after 5000ms: plan-context");
    }

    #[test]
    fn recall_display() {
        let err = HookError::Recall("exit code 2: no index".into());
        assert_eq!(err.to_string(), "recall failed: exit code 2: no index");
    }
}
