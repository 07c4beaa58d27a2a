//! JSON state files shared between short-lived hook processes.
//!
//! Each invocation reads, computes, and writes back in one pass with no
//! locking. Concurrent writers may lose an update; readers never observe a
//! half-written file because saves go through a sibling temp file and rename.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::StateError;

/// Outcome of loading a state file.
#[derive(Debug, Clone, PartialEq)]
pub enum StateLoad<T> {
    /// No file at the path.
    Missing,
    /// File decoded successfully.
    Loaded(T),
    /// File exists but could not be read or decoded.
    Corrupt(String),
}

/// Load and decode a JSON state file.
pub fn load_state<T: DeserializeOwned>(path: &Path) -> StateLoad<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no state file");
            return StateLoad::Missing;
        }
        Err(e) => return StateLoad::Corrupt(format!("read failed: {e}")),
    };

    match serde_json::from_str(&content) {
        Ok(value) => StateLoad::Loaded(value),
        Err(e) => StateLoad::Corrupt(format!("invalid JSON: {e}")),
    }
}

/// Encode and write a JSON state file, creating parent directories.
pub fn save_state<T: Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, json)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(path = %path.display(), "state saved");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
        label: String,
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let load: StateLoad<Sample> = load_state(&dir.path().join("none.json"));
        assert_eq!(load, StateLoad::Missing);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        let sample = Sample {
            count: 3,
            label: "x".into(),
        };
        save_state(&path, &sample).unwrap();
        assert_eq!(load_state::<Sample>(&path), StateLoad::Loaded(sample));
    }

    #[test]
    fn corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_matches!(load_state::<Sample>(&path), StateLoad::Corrupt(_));
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"count":"three"}"#).unwrap();
        assert_matches!(load_state::<Sample>(&path), StateLoad::Corrupt(_));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        save_state(&path, &Sample { count: 1, label: String::new() }).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let result = save_state(&blocker.join("state.json"), &1);
        assert_matches!(result, Err(StateError::Io(_)));
    }
}
