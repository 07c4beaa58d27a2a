//! Learning-reminder hook.
//!
//! Tracks rolling per-session counters across invocations and, when a
//! heuristic fires, allows the action with a reminder injected as context.

pub mod store;
pub mod tracker;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hookgate_core::{ActionEvent, HookDecision};
use hookgate_settings::{HeuristicSettings, expand_path};
use tracing::{debug, warn};

pub use store::{SessionHeuristics, SessionStore};
pub use tracker::{HeuristicTracker, Reminder, ReminderKind};

use crate::errors::HookError;
use crate::handler::HookHandler;

/// The learning-reminder hook: file-backed [`HeuristicTracker`].
pub struct LearningReminder {
    tracker: HeuristicTracker,
    store_path: PathBuf,
}

impl LearningReminder {
    /// Create the hook with the store at the configured path.
    pub fn new(settings: HeuristicSettings) -> Self {
        let store_path = expand_path(&settings.store_path);
        Self {
            tracker: HeuristicTracker::new(settings),
            store_path,
        }
    }

    /// Where session state is persisted.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Load, update and save the session store for one event.
    pub fn process(&self, event: &ActionEvent, now_ms: i64) -> Option<Reminder> {
        let capacity = self.tracker.settings().max_sessions;
        let mut store = SessionStore::load(&self.store_path, capacity);

        let session = event.session_key();
        let mut state = store.get(session).cloned().unwrap_or_default();
        let reminder = self.tracker.observe(&mut state, event, now_ms);

        let evicted = store.put(session, state);
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "sessions evicted from heuristic store");
        }
        if let Err(e) = store.save(&self.store_path) {
            warn!(path = %self.store_path.display(), error = %e, "failed to save heuristic store");
        }
        reminder
    }
}

#[async_trait]
impl HookHandler for LearningReminder {
    fn name(&self) -> &str {
        "learning-reminder"
    }

    async fn handle(&self, event: &ActionEvent, now_ms: i64) -> Result<HookDecision, HookError> {
        Ok(match self.process(event, now_ms) {
            Some(reminder) => {
                debug!(kind = %reminder.kind, session = %event.session_key(), "learning reminder");
                HookDecision::allow_with_context(reminder.tagged())
            }
            None => HookDecision::allow(),
        })
    }
}
