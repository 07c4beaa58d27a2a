//! Reminder heuristics over a session's recent actions.
//!
//! Each event first updates the session state, then the decision runs in
//! priority order: cooldown, edit sequence, error fix.

use hookgate_core::ActionEvent;
use hookgate_settings::{HeuristicSettings, expand_path};
use serde::{Deserialize, Serialize};

use super::store::SessionHeuristics;

/// Which heuristic fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Several edits in quick succession.
    EditSequence,
    /// An edit following discussion of an error.
    ErrorFix,
}

impl ReminderKind {
    /// Wire tag, also used to label injected context.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EditSequence => "edit_sequence",
            Self::ErrorFix => "error_fix",
        }
    }

    /// Learning type suggested for the store command.
    #[must_use]
    pub fn learning_type(self) -> &'static str {
        match self {
            Self::EditSequence => "WORKING_SOLUTION",
            Self::ErrorFix => "ERROR_FIX",
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A "consider storing this insight" reminder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Heuristic that fired.
    pub kind: ReminderKind,
    /// Text for the assistant.
    pub message: String,
}

impl Reminder {
    fn new(kind: ReminderKind, store_command: &str, session_id: &str) -> Self {
        let lead = match kind {
            ReminderKind::EditSequence => {
                "Several edits landed in quick succession. If this approach works, it may be worth keeping."
            }
            ReminderKind::ErrorFix => {
                "This edit follows investigation of an error. If it resolves the problem, record the fix."
            }
        };
        let message = format!(
            "{lead} Store it with: {store_command} --session-id {session_id} --type {} \
             --context \"<what this relates to>\" --content \"<what worked and why>\"",
            kind.learning_type()
        );
        Self { kind, message }
    }

    /// `[tag] message`, the form injected as additional context.
    #[must_use]
    pub fn tagged(&self) -> String {
        format!("[{}] {}", self.kind, self.message)
    }
}

/// Applies the reminder heuristics to session state.
#[derive(Clone, Debug)]
pub struct HeuristicTracker {
    settings: HeuristicSettings,
    store_command: String,
}

impl HeuristicTracker {
    /// Tracker with the given tuning.
    pub fn new(settings: HeuristicSettings) -> Self {
        let store_command = std::iter::once(settings.store_program.clone())
            .chain(
                settings
                    .store_args
                    .iter()
                    .map(|a| expand_path(a).to_string_lossy().into_owned()),
            )
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            settings,
            store_command,
        }
    }

    /// Store command named in reminders, without per-reminder arguments.
    pub fn store_command(&self) -> &str {
        &self.store_command
    }

    /// Tuning in effect.
    pub fn settings(&self) -> &HeuristicSettings {
        &self.settings
    }

    /// Whether `kind` is edit-class.
    pub fn is_edit(&self, kind: &str) -> bool {
        self.settings.edit_actions.iter().any(|k| k == kind)
    }

    /// Whether `event` is an inspection whose parameters mention an error.
    pub fn mentions_error(&self, event: &ActionEvent) -> bool {
        if !event.is_kind_in(&self.settings.inspection_actions) {
            return false;
        }
        let text = event.parameters_text().to_lowercase();
        self.settings
            .error_keywords
            .iter()
            .any(|kw| text.contains(&kw.to_lowercase()))
    }

    /// Fold `event` into `state`, without deciding.
    pub fn record(&self, state: &mut SessionHeuristics, event: &ActionEvent, now_ms: i64) {
        state.push_action(&event.action_kind, self.settings.recent_action_capacity);

        if self.is_edit(&event.action_kind) {
            if now_ms.saturating_sub(state.last_edit_ms) > self.settings.edit_window_ms {
                state.edit_count = 0;
            }
            state.edit_count = state.edit_count.saturating_add(1);
            state.last_edit_ms = now_ms;
        }

        if self.mentions_error(event) {
            state.error_discussed = true;
        }
    }

    /// Decide whether `state` warrants a reminder at `now_ms`.
    ///
    /// A reminder resets the edit counter and the error flag and starts the
    /// cooldown.
    pub fn decide(&self, state: &mut SessionHeuristics, now_ms: i64) -> Option<ReminderKind> {
        if let Some(last) = state.last_prompt_ms {
            if now_ms.saturating_sub(last) < self.settings.cooldown_ms {
                return None;
            }
        }

        let kind = if state.edit_count >= self.settings.edit_threshold
            && now_ms.saturating_sub(state.last_edit_ms) <= self.settings.edit_window_ms
        {
            ReminderKind::EditSequence
        } else if state.error_discussed && state.last_action().is_some_and(|k| self.is_edit(k)) {
            ReminderKind::ErrorFix
        } else {
            return None;
        };

        state.edit_count = 0;
        state.error_discussed = false;
        state.last_prompt_ms = Some(now_ms);
        Some(kind)
    }

    /// [`record`](Self::record) then [`decide`](Self::decide), with the
    /// reminder addressed to the event's session.
    pub fn observe(&self, state: &mut SessionHeuristics, event: &ActionEvent, now_ms: i64) -> Option<Reminder> {
        self.record(state, event, now_ms);
        let kind = self.decide(state, now_ms)?;
        Some(Reminder::new(kind, &self.store_command, event.session_key()))
    }
}
