//! Learning-reminder heuristic settings.

use serde::{Deserialize, Serialize};

/// Configuration for the per-session heuristic tracker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeuristicSettings {
    /// Session store, keyed by session id.
    pub store_path: String,
    /// Minimum gap between two reminders in one session.
    pub cooldown_ms: i64,
    /// Edits further apart than this restart the edit sequence.
    pub edit_window_ms: i64,
    /// Consecutive edits that trigger an edit-sequence reminder.
    pub edit_threshold: u32,
    /// Sessions retained in the store.
    pub max_sessions: usize,
    /// Length of the recent-action ring.
    pub recent_action_capacity: usize,
    /// Action kinds counted as edits.
    pub edit_actions: Vec<String>,
    /// Action kinds whose parameters are scanned for error keywords.
    pub inspection_actions: Vec<String>,
    /// Case-insensitive keywords marking error discussion.
    pub error_keywords: Vec<String>,
    /// Program the reminder tells the assistant to run to store a learning.
    pub store_program: String,
    /// Leading arguments for [`store_program`](Self::store_program); `~` and
    /// `$VAR` are expanded.
    pub store_args: Vec<String>,
    /// How long to wait for the event on stdin.
    pub stdin_timeout_ms: u64,
}

impl Default for HeuristicSettings {
    fn default() -> Self {
        Self {
            store_path: "~/.cache/hookgate/heuristics.json".to_string(),
            cooldown_ms: 5 * 60 * 1000,
            edit_window_ms: 2 * 60 * 1000,
            edit_threshold: 3,
            max_sessions: 10,
            recent_action_capacity: 10,
            edit_actions: ["Edit", "Write", "MultiEdit", "NotebookEdit"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            inspection_actions: vec!["Grep".to_string(), "Read".to_string()],
            error_keywords: ["error", "bug", "fix", "debug"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            store_program: "uv".to_string(),
            store_args: vec![
                "run".to_string(),
                "python".to_string(),
                "~/.claude/scripts/core/store_learning.py".to_string(),
            ],
            stdin_timeout_ms: 5000,
        }
    }
}
