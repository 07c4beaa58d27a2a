//! Phase gate settings.

use serde::{Deserialize, Serialize};

/// Configuration for the workflow phase gate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseGateSettings {
    /// Shared state record written by the workflow orchestrator.
    pub state_path: String,
    /// Records older than this are treated as absent.
    pub ttl_ms: i64,
    /// Action kind that hands work to a sub-agent.
    pub delegation_action: String,
    /// Parameter naming the sub-agent kind on a delegation.
    pub sub_kind_parameter: String,
    /// Sub-agent kinds permitted during recon (case-insensitive).
    pub exploration_agents: Vec<String>,
    /// Action the assistant should use during the interview phase.
    pub question_action: String,
    /// How long to wait for the event on stdin.
    pub stdin_timeout_ms: u64,
}

impl Default for PhaseGateSettings {
    fn default() -> Self {
        Self {
            state_path: std::env::temp_dir()
                .join("hookgate-phase-gate.json")
                .to_string_lossy()
                .into_owned(),
            ttl_ms: 60 * 60 * 1000,
            delegation_action: "Task".to_string(),
            sub_kind_parameter: "subagent_type".to_string(),
            exploration_agents: vec!["scout".to_string(), "explore".to_string()],
            question_action: "AskUserQuestion".to_string(),
            stdin_timeout_ms: 5000,
        }
    }
}
