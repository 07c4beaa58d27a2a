//! Health diagnostics settings.

use serde::{Deserialize, Serialize};

/// Configuration for the diagnostics report.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsSettings {
    /// Host settings file carrying hook registrations.
    pub registration_path: String,
    /// Append-only error log shared by all hooks.
    pub error_log_path: String,
    /// Only the most recent lines of the error log are read.
    pub max_log_lines: usize,
    /// Errors inside the recent window above this count mean unhealthy.
    pub unhealthy_error_threshold: usize,
    /// Width of the "recent errors" window.
    pub recent_window_ms: i64,
    /// Substituted for `$CLAUDE_PROJECT_DIR` in hook commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<String>,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            registration_path: "~/.claude/settings.json".to_string(),
            error_log_path: "~/.claude/hooks/errors.log".to_string(),
            max_log_lines: 50,
            unhealthy_error_threshold: 10,
            recent_window_ms: 60 * 60 * 1000,
            project_dir: None,
        }
    }
}
