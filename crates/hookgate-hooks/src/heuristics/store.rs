//! Persisted per-session heuristic state with recency-capped eviction.
//!
//! The store is a plain JSON object keyed by session id on disk. In memory it
//! keeps a [`BTreeSet`] of `(last_edit_ms, session_id)` next to the map so the
//! least-recently-edited session is found without re-sorting on every write.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::Path;

use hookgate_core::StateError;
use hookgate_core::state::{StateLoad, load_state, save_state};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rolling heuristic state for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionHeuristics {
    /// Consecutive edits inside the edit window.
    pub edit_count: u32,
    /// Time of the last edit-class action, epoch milliseconds (0 = never).
    pub last_edit_ms: i64,
    /// Most recent action kinds, oldest first.
    pub recent_actions: VecDeque<String>,
    /// An inspection action mentioned an error since the last reminder.
    pub error_discussed: bool,
    /// Time of the last reminder, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_prompt_ms: Option<i64>,
}

impl SessionHeuristics {
    /// The most recent action kind.
    pub fn last_action(&self) -> Option<&str> {
        self.recent_actions.back().map(String::as_str)
    }

    /// Append to the ring, dropping the oldest entries beyond `capacity`.
    pub fn push_action(&mut self, kind: &str, capacity: usize) {
        self.recent_actions.push_back(kind.to_string());
        while self.recent_actions.len() > capacity {
            let _ = self.recent_actions.pop_front();
        }
    }
}

/// Bounded map of session id to [`SessionHeuristics`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: HashMap<String, SessionHeuristics>,
    recency: BTreeSet<(i64, String)>,
    capacity: usize,
}

impl SessionStore {
    /// Empty store holding at most `capacity` sessions.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            recency: BTreeSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Build from decoded sessions, trimming to `capacity`.
    pub fn from_sessions(sessions: HashMap<String, SessionHeuristics>, capacity: usize) -> Self {
        let mut store = Self::new(capacity);
        store.recency = sessions
            .iter()
            .map(|(id, state)| (state.last_edit_ms, id.clone()))
            .collect();
        store.sessions = sessions;
        let _ = store.evict_excess(None);
        store
    }

    /// Load from `path`. Missing or corrupt files yield an empty store.
    pub fn load(path: &Path, capacity: usize) -> Self {
        match load_state::<HashMap<String, SessionHeuristics>>(path) {
            StateLoad::Loaded(sessions) => Self::from_sessions(sessions, capacity),
            StateLoad::Missing => Self::new(capacity),
            StateLoad::Corrupt(reason) => {
                warn!(path = %path.display(), %reason, "heuristic store unreadable, starting fresh");
                Self::new(capacity)
            }
        }
    }

    /// Write to `path`, sessions ordered by id.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let ordered: BTreeMap<&String, &SessionHeuristics> = self.sessions.iter().collect();
        save_state(path, &ordered)
    }

    /// State for `session_id`, if tracked.
    pub fn get(&self, session_id: &str) -> Option<&SessionHeuristics> {
        self.sessions.get(session_id)
    }

    /// Insert or replace a session, then evict down to capacity.
    ///
    /// The session just written is never the one evicted. Returns the ids of
    /// evicted sessions.
    pub fn put(&mut self, session_id: &str, state: SessionHeuristics) -> Vec<String> {
        if let Some(previous) = self.sessions.get(session_id) {
            let _ = self
                .recency
                .remove(&(previous.last_edit_ms, session_id.to_string()));
        }
        let _ = self
            .recency
            .insert((state.last_edit_ms, session_id.to_string()));
        let _ = self.sessions.insert(session_id.to_string(), state);
        self.evict_excess(Some(session_id))
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether `session_id` is tracked.
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    fn evict_excess(&mut self, keep: Option<&str>) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.sessions.len() > self.capacity {
            let victim = self
                .recency
                .iter()
                .find(|(_, id)| Some(id.as_str()) != keep)
                .cloned();
            let Some(entry) = victim else { break };
            let _ = self.recency.remove(&entry);
            let _ = self.sessions.remove(&entry.1);
            debug!(session = %entry.1, last_edit_ms = entry.0, "evicted session heuristics");
            evicted.push(entry.1);
        }
        evicted
    }
}
