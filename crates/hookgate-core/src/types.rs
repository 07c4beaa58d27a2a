//! Core types for the hook contract.
//!
//! The host serializes one event per invocation on stdin and reads one
//! decision from stdout. Field names follow the host's `snake_case` wire
//! format; the host's native tool field names are accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session bucket used when the host omits `session_id`.
pub const DEFAULT_SESSION_ID: &str = "default";

/// One intercepted action, as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Kind of action about to run (e.g. `Edit`, `Task`, `EnterPlanMode`).
    #[serde(alias = "tool_name")]
    pub action_kind: String,
    /// Opaque parameters of the action.
    #[serde(default, alias = "tool_input")]
    pub action_parameters: Value,
    /// Session the action belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Fields this version does not understand, kept untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionEvent {
    /// Create an event with the given kind and parameters.
    #[must_use]
    pub fn new(action_kind: impl Into<String>, action_parameters: Value) -> Self {
        Self {
            action_kind: action_kind.into(),
            action_parameters,
            session_id: None,
            extra: Map::new(),
        }
    }

    /// Builder-style session assignment.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Session key, falling back to [`DEFAULT_SESSION_ID`].
    #[must_use]
    pub fn session_key(&self) -> &str {
        self.session_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID)
    }

    /// String parameter by name, if present.
    #[must_use]
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.action_parameters.get(key).and_then(Value::as_str)
    }

    /// Compact JSON rendering of the parameters (empty for `null`).
    #[must_use]
    pub fn parameters_text(&self) -> String {
        if self.action_parameters.is_null() {
            return String::new();
        }
        self.action_parameters.to_string()
    }

    /// Whether the action kind is one of `kinds`.
    #[must_use]
    pub fn is_kind_in(&self, kinds: &[String]) -> bool {
        kinds.iter().any(|k| k == &self.action_kind)
    }
}

/// Decoded stdin payload.
///
/// Every handler must treat [`HookInput::Malformed`] as the most permissive
/// event: it is never a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum HookInput {
    /// A payload that decoded into an [`ActionEvent`].
    WellFormed(ActionEvent),
    /// Empty, unparseable or structurally wrong payload.
    Malformed {
        /// Why decoding failed.
        reason: String,
    },
}

impl HookInput {
    /// Decode a raw stdin payload.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Malformed {
                reason: "empty input".to_string(),
            };
        }
        match serde_json::from_str::<ActionEvent>(trimmed) {
            Ok(event) => Self::WellFormed(event),
            Err(e) => Self::Malformed {
                reason: e.to_string(),
            },
        }
    }

    /// The event, if well-formed.
    #[must_use]
    pub fn event(&self) -> Option<&ActionEvent> {
        match self {
            Self::WellFormed(event) => Some(event),
            Self::Malformed { .. } => None,
        }
    }
}

/// Allow/deny verdict. Absence on the wire means allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Let the action run.
    #[default]
    Allow,
    /// Block the action.
    Deny,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// The single decision emitted per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDecision {
    /// Allow or deny.
    #[serde(default)]
    pub decision: Verdict,
    /// Shown to the operator when the action is denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Injected into the assistant's ongoing reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

impl HookDecision {
    /// Plain allow.
    #[must_use]
    pub fn allow() -> Self {
        Self::default()
    }

    /// Deny with a reason.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Deny,
            reason: Some(reason.into()),
            additional_context: None,
        }
    }

    /// Allow and inject context.
    #[must_use]
    pub fn allow_with_context(context: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Allow,
            reason: None,
            additional_context: Some(context.into()),
        }
    }

    /// Whether this decision blocks the action.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.decision == Verdict::Deny
    }
}
