//! Workflow phase gate.
//!
//! An external orchestrator writes a single activation record and flips its
//! completion flags as the workflow advances. The gate only reads that record
//! and restricts delegated sub-task actions to what the current phase allows:
//!
//! | Phase | Delegation |
//! |---|---|
//! | `INACTIVE` | allowed |
//! | `RECON` | exploration agents only |
//! | `INTERVIEW` | denied, ask the operator instead |
//! | `AWAITING_APPROVAL` | denied until the plan is approved |
//! | `UNBLOCKED` | allowed |
//!
//! A missing, corrupt, inactive or expired record means no workflow is
//! running. The gate never denies because of its own failures.

use std::path::PathBuf;

use async_trait::async_trait;
use hookgate_core::state::{StateLoad, load_state};
use hookgate_core::{ActionEvent, HookDecision};
use hookgate_settings::{PhaseGateSettings, expand_path};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::HookError;
use crate::handler::HookHandler;

/// The persisted activation record.
///
/// Flags only ever move from `false` to `true` within one activation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseGateState {
    /// Activation time, epoch milliseconds.
    pub activated_at: i64,
    /// Whether a workflow is running.
    pub active: bool,
    /// Reconnaissance finished.
    pub recon_complete: bool,
    /// Operator interview finished.
    pub interview_complete: bool,
    /// Plan approved by the operator.
    pub plan_approved: bool,
}

impl PhaseGateState {
    /// A fresh activation at `now_ms` with every flag cleared.
    #[must_use]
    pub fn activated(now_ms: i64) -> Self {
        Self {
            activated_at: now_ms,
            active: true,
            ..Self::default()
        }
    }

    /// Whether the record is older than `ttl_ms` at `now_ms`.
    #[must_use]
    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.activated_at) > ttl_ms
    }

    /// The phase this record puts the workflow in.
    #[must_use]
    pub fn phase(&self, now_ms: i64, ttl_ms: i64) -> Phase {
        if !self.active || self.is_expired(now_ms, ttl_ms) {
            Phase::Inactive
        } else if !self.recon_complete {
            Phase::Recon
        } else if !self.interview_complete {
            Phase::Interview
        } else if !self.plan_approved {
            Phase::AwaitingApproval
        } else {
            Phase::Unblocked
        }
    }
}

/// Workflow stage, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No workflow running.
    Inactive,
    /// Exploration only.
    Recon,
    /// Direct questions to the operator only.
    Interview,
    /// Plan written, waiting on the operator.
    AwaitingApproval,
    /// Everything permitted until the record is cleared.
    Unblocked,
}

impl Phase {
    /// Upper-case label used in denial reasons.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Recon => "RECON",
            Self::Interview => "INTERVIEW",
            Self::AwaitingApproval => "AWAITING_APPROVAL",
            Self::Unblocked => "UNBLOCKED",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const UNSPECIFIED_SUB_KIND: &str = "<unspecified>";

/// The phase gate hook.
pub struct PhaseGate {
    settings: PhaseGateSettings,
    state_path: PathBuf,
}

impl PhaseGate {
    /// Create a gate reading the record at the configured state path.
    pub fn new(settings: PhaseGateSettings) -> Self {
        let state_path = expand_path(&settings.state_path);
        Self {
            settings,
            state_path,
        }
    }

    /// Where the activation record is read from.
    pub fn state_path(&self) -> &std::path::Path {
        &self.state_path
    }

    /// Read the activation record. Corrupt records count as absent.
    pub fn load(&self) -> Option<PhaseGateState> {
        match load_state::<PhaseGateState>(&self.state_path) {
            StateLoad::Loaded(state) => Some(state),
            StateLoad::Missing => None,
            StateLoad::Corrupt(reason) => {
                warn!(path = %self.state_path.display(), %reason, "phase gate record unreadable, treating as inactive");
                None
            }
        }
    }

    fn is_exploration(&self, sub_kind: &str) -> bool {
        self.settings
            .exploration_agents
            .iter()
            .any(|agent| agent.eq_ignore_ascii_case(sub_kind))
    }

    /// Decide one event against a (possibly absent) record.
    pub fn evaluate(&self, event: &ActionEvent, state: Option<&PhaseGateState>, now_ms: i64) -> HookDecision {
        if event.action_kind != self.settings.delegation_action {
            return HookDecision::allow();
        }
        let Some(state) = state else {
            return HookDecision::allow();
        };

        let phase = state.phase(now_ms, self.settings.ttl_ms);
        let sub_kind = event
            .parameter_str(&self.settings.sub_kind_parameter)
            .filter(|s| !s.is_empty());

        match phase {
            Phase::Inactive | Phase::Unblocked => HookDecision::allow(),
            Phase::Recon if sub_kind.is_some_and(|s| self.is_exploration(s)) => {
                debug!(sub_kind = ?sub_kind, "exploration delegation allowed during recon");
                HookDecision::allow()
            }
            Phase::Recon => HookDecision::deny(format!(
                "Phase gate: {phase} phase is active. Only exploration agents ({allowed}) may be \
                 delegated via {action}; blocked sub-agent '{blocked}'. Finish reconnaissance and \
                 mark recon complete before delegating other work.",
                allowed = self.settings.exploration_agents.join(", "),
                action = self.settings.delegation_action,
                blocked = sub_kind.unwrap_or(UNSPECIFIED_SUB_KIND),
            )),
            Phase::Interview => HookDecision::deny(format!(
                "Phase gate: {phase} phase is active. Delegation via {action} is blocked \
                 (sub-agent '{blocked}'). Ask the operator directly with {question} until the \
                 interview is complete.",
                action = self.settings.delegation_action,
                blocked = sub_kind.unwrap_or(UNSPECIFIED_SUB_KIND),
                question = self.settings.question_action,
            )),
            Phase::AwaitingApproval => HookDecision::deny(format!(
                "Phase gate: {phase} phase is active. The plan awaits operator approval; \
                 delegation via {action} is blocked (sub-agent '{blocked}'). Present the plan and \
                 wait for approval before delegating.",
                action = self.settings.delegation_action,
                blocked = sub_kind.unwrap_or(UNSPECIFIED_SUB_KIND),
            )),
        }
    }
}

#[async_trait]
impl HookHandler for PhaseGate {
    fn name(&self) -> &str {
        "phase-gate"
    }

    fn should_handle(&self, event: &ActionEvent) -> bool {
        event.action_kind == self.settings.delegation_action
    }

    async fn handle(&self, event: &ActionEvent, now_ms: i64) -> Result<HookDecision, HookError> {
        let state = self.load();
        let decision = self.evaluate(event, state.as_ref(), now_ms);
        if decision.is_denied() {
            debug!(kind = %event.action_kind, "phase gate denied delegation");
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookgate_core::HookInput;
    use hookgate_core::clock::{HOUR_MS, MINUTE_MS};
    use hookgate_core::state::save_state;
    use serde_json::json;
    use std::sync::Arc;

    const NOW: i64 = 1_750_000_000_000;

    fn gate_at(dir: &tempfile::TempDir) -> PhaseGate {
        PhaseGate::new(PhaseGateSettings {
            state_path: dir.path().join("phase.json").to_string_lossy().into_owned(),
            ..PhaseGateSettings::default()
        })
    }

    fn delegate(sub_kind: &str) -> ActionEvent {
        ActionEvent::new("Task", json!({"subagent_type": sub_kind, "prompt": "go"}))
    }

    fn recon_state() -> PhaseGateState {
        PhaseGateState::activated(NOW - MINUTE_MS)
    }

    // --- Phase derivation ---

    #[test]
    fn phase_progression() {
        let mut state = recon_state();
        assert_eq!(state.phase(NOW, HOUR_MS), Phase::Recon);
        state.recon_complete = true;
        assert_eq!(state.phase(NOW, HOUR_MS), Phase::Interview);
        state.interview_complete = true;
        assert_eq!(state.phase(NOW, HOUR_MS), Phase::AwaitingApproval);
        state.plan_approved = true;
        assert_eq!(state.phase(NOW, HOUR_MS), Phase::Unblocked);
    }

    #[test]
    fn inactive_flag_wins_over_other_flags() {
        let state = PhaseGateState {
            active: false,
            ..recon_state()
        };
        assert_eq!(state.phase(NOW, HOUR_MS), Phase::Inactive);
    }

    #[test]
    fn expiry_is_strictly_after_ttl() {
        let state = PhaseGateState::activated(NOW - HOUR_MS);
        assert!(!state.is_expired(NOW, HOUR_MS));
        assert!(state.is_expired(NOW + 1, HOUR_MS));
        assert_eq!(state.phase(NOW + 1, HOUR_MS), Phase::Inactive);
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let state: PhaseGateState = serde_json::from_str(
            r#"{"activatedAt":5,"active":true,"reconComplete":true,"interviewComplete":false,"planApproved":false}"#,
        )
        .unwrap();
        assert_eq!(state.activated_at, 5);
        assert!(state.recon_complete);
        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["planApproved"], false);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::AwaitingApproval.to_string(), "AWAITING_APPROVAL");
        assert_eq!(Phase::Recon.to_string(), "RECON");
    }

    // --- evaluate ---

    #[test]
    fn non_delegation_always_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = recon_state();
        for kind in ["Edit", "Bash", "Read", "AskUserQuestion"] {
            let event = ActionEvent::new(kind, json!({"subagent_type": "kraken"}));
            assert!(!gate.evaluate(&event, Some(&state), NOW).is_denied(), "{kind}");
        }
    }

    #[test]
    fn no_state_allows_everything() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        assert!(!gate.evaluate(&delegate("kraken"), None, NOW).is_denied());
    }

    #[test]
    fn inactive_allows_regardless_of_flags() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        for bits in 0..8u8 {
            let state = PhaseGateState {
                activated_at: NOW,
                active: false,
                recon_complete: bits & 1 != 0,
                interview_complete: bits & 2 != 0,
                plan_approved: bits & 4 != 0,
            };
            assert!(!gate.evaluate(&delegate("kraken"), Some(&state), NOW).is_denied());
        }
    }

    #[test]
    fn recon_allows_scout_denies_kraken() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = recon_state();

        assert!(!gate.evaluate(&delegate("scout"), Some(&state), NOW).is_denied());

        let denied = gate.evaluate(&delegate("kraken"), Some(&state), NOW);
        assert!(denied.is_denied());
        let reason = denied.reason.unwrap();
        assert!(reason.contains("RECON"));
        assert!(reason.contains("scout, explore"));
        assert!(reason.contains("'kraken'"));
    }

    #[test]
    fn recon_allow_list_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = recon_state();
        assert!(!gate.evaluate(&delegate("Scout"), Some(&state), NOW).is_denied());
        assert!(!gate.evaluate(&delegate("EXPLORE"), Some(&state), NOW).is_denied());
    }

    #[test]
    fn recon_denies_missing_sub_kind() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let event = ActionEvent::new("Task", json!({"prompt": "go"}));
        let decision = gate.evaluate(&event, Some(&recon_state()), NOW);
        assert!(decision.reason.unwrap().contains(UNSPECIFIED_SUB_KIND));
    }

    #[test]
    fn interview_denies_all_delegation() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = PhaseGateState {
            recon_complete: true,
            ..recon_state()
        };
        let decision = gate.evaluate(&delegate("scout"), Some(&state), NOW);
        let reason = decision.reason.unwrap();
        assert!(reason.contains("INTERVIEW"));
        assert!(reason.contains("AskUserQuestion"));
    }

    #[test]
    fn awaiting_approval_denies_all_delegation() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = PhaseGateState {
            recon_complete: true,
            interview_complete: true,
            ..recon_state()
        };
        let decision = gate.evaluate(&delegate("explore"), Some(&state), NOW);
        let reason = decision.reason.unwrap();
        assert!(reason.contains("AWAITING_APPROVAL"));
        assert!(reason.contains("approval"));
    }

    #[test]
    fn unblocked_allows() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = PhaseGateState {
            recon_complete: true,
            interview_complete: true,
            plan_approved: true,
            ..recon_state()
        };
        assert!(!gate.evaluate(&delegate("kraken"), Some(&state), NOW).is_denied());
    }

    #[test]
    fn expired_record_behaves_like_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let state = PhaseGateState::activated(NOW - HOUR_MS - 1);
        assert_eq!(
            gate.evaluate(&delegate("kraken"), Some(&state), NOW),
            gate.evaluate(&delegate("kraken"), None, NOW)
        );
    }

    // --- handle (file-backed) ---

    #[tokio::test]
    async fn handle_reads_record_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        save_state(gate.state_path(), &recon_state()).unwrap();

        let decision = gate.handle(&delegate("kraken"), NOW).await.unwrap();
        assert!(decision.is_denied());
    }

    #[tokio::test]
    async fn handle_corrupt_record_allows() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        std::fs::write(gate.state_path(), "{ not json").unwrap();

        let decision = gate.handle(&delegate("kraken"), NOW).await.unwrap();
        assert!(!decision.is_denied());
    }

    #[tokio::test]
    async fn handle_missing_record_allows() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate_at(&dir);
        let decision = gate.handle(&delegate("kraken"), NOW).await.unwrap();
        assert!(!decision.is_denied());
    }

    #[tokio::test]
    async fn runner_allows_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(gate_at(&dir));
        save_state(gate.state_path(), &recon_state()).unwrap();

        let decision = crate::runner::run_hook(gate, HookInput::parse("garbage"), NOW).await;
        assert!(!decision.is_denied());
    }
}
