//! Hook registration parsing.
//!
//! Two shapes are accepted under each lifecycle event name:
//!
//! ```json
//! { "hooks": { "PreToolUse": [
//!     { "matcher": "Task", "hooks": [{ "type": "command", "command": "...", "timeout": 10 }] }
//! ] } }
//! ```
//!
//! and the flat form `{ "PreToolUse": [{ "matcher": "Task", "command": "...", "timeout": 10 }] }`,
//! with or without the top-level `hooks` wrapper. Entries that fit neither
//! shape are skipped, as are non-command hooks (`"type": "prompt"`) inside a
//! matcher group; the group's command hooks are still kept.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::DiagnosticsError;

/// One registered hook command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRegistration {
    /// Lifecycle event (e.g. `PreToolUse`).
    pub event: String,
    /// Action-kind matcher, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    /// Shell command the host runs.
    pub command: String,
    /// Timeout in seconds, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[derive(Deserialize)]
struct RawCommand {
    command: String,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    matcher: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Nested {
        #[serde(default)]
        matcher: Option<String>,
        hooks: Vec<Value>,
    },
    Flat(RawCommand),
}

/// Load registrations from `path`. A missing file means none.
pub fn load_registrations(path: &Path) -> Result<Vec<HookRegistration>, DiagnosticsError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no registration file");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let value: Value = serde_json::from_str(&content)?;
    parse_registrations(&value)
}

/// Flatten a registration document into one record per command.
pub fn parse_registrations(root: &Value) -> Result<Vec<HookRegistration>, DiagnosticsError> {
    let table = match root.get("hooks") {
        Some(hooks) => hooks,
        None => root,
    };
    let Some(events) = table.as_object() else {
        return Err(DiagnosticsError::Registration(
            "expected an object of lifecycle events".into(),
        ));
    };

    let mut registrations = Vec::new();
    for (event, entries) in events {
        let Some(entries) = entries.as_array() else {
            debug!(%event, "skipping non-list registration value");
            continue;
        };
        for entry in entries {
            match serde_json::from_value::<RawEntry>(entry.clone()) {
                Ok(RawEntry::Nested { matcher, hooks }) => {
                    for hook in hooks {
                        match serde_json::from_value::<RawCommand>(hook) {
                            Ok(h) => registrations.push(HookRegistration {
                                event: event.clone(),
                                matcher: h.matcher.or_else(|| matcher.clone()),
                                command: h.command,
                                timeout: h.timeout,
                            }),
                            Err(e) => debug!(%event, error = %e, "skipping non-command hook"),
                        }
                    }
                }
                Ok(RawEntry::Flat(h)) => registrations.push(HookRegistration {
                    event: event.clone(),
                    matcher: h.matcher,
                    command: h.command,
                    timeout: h.timeout,
                }),
                Err(e) => warn!(%event, error = %e, "skipping unrecognized registration entry"),
            }
        }
    }
    Ok(registrations)
}
