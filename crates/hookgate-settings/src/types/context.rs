//! Plan-mode context injection settings.

use serde::{Deserialize, Serialize};

/// Configuration for recall-backed context injection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextInjectionSettings {
    /// The only action kind that triggers a recall.
    pub trigger_action: String,
    /// Recall collaborator executable.
    pub recall_program: String,
    /// Arguments placed before `--query`.
    pub recall_args: Vec<String>,
    /// Fixed recall query.
    pub query: String,
    /// Result-count limit passed as `--k`.
    pub limit: u32,
    /// Pass `--text-only` to the collaborator.
    pub text_only: bool,
    /// Hard limit on the recall call.
    pub timeout_ms: u64,
    /// Responses this short or shorter are ignored.
    pub min_response_chars: usize,
    /// Injected context is truncated to this many characters.
    pub max_context_chars: usize,
    /// How long to wait for the event on stdin.
    pub stdin_timeout_ms: u64,
}

impl Default for ContextInjectionSettings {
    fn default() -> Self {
        Self {
            trigger_action: "EnterPlanMode".to_string(),
            recall_program: "uv".to_string(),
            recall_args: vec![
                "run".to_string(),
                "python".to_string(),
                "~/.claude/scripts/core/recall_learnings.py".to_string(),
            ],
            query: "planning approach architecture decisions patterns".to_string(),
            limit: 3,
            text_only: true,
            timeout_ms: 5000,
            min_response_chars: 20,
            max_context_chars: 1500,
            stdin_timeout_ms: 1000,
        }
    }
}
