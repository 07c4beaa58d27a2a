//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`HookgateSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply `HOOKGATE_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::paths::{expand_path, home_dir};
use crate::types::HookgateSettings;

/// Env var naming an alternative settings file.
pub const SETTINGS_PATH_ENV: &str = "HOOKGATE_SETTINGS";

/// Resolve the settings file path (`$HOOKGATE_SETTINGS` or `~/.hookgate/settings.json`).
pub fn settings_path() -> PathBuf {
    if let Some(custom) = read_env_string(SETTINGS_PATH_ENV) {
        return expand_path(&custom);
    }
    PathBuf::from(home_dir())
        .join(".hookgate")
        .join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<HookgateSettings> {
    let defaults = serde_json::to_value(HookgateSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: HookgateSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Load settings, falling back to defaults (plus env overrides) on any error.
///
/// Hooks must never fail because of configuration. The load error is handed
/// back so the caller can log it once its subscriber is installed.
pub fn load_settings_or_default(path: &Path) -> (HookgateSettings, Option<SettingsError>) {
    match load_settings_from_path(path) {
        Ok(settings) => (settings, None),
        Err(e) => {
            let mut settings = HookgateSettings::default();
            apply_env_overrides(&mut settings);
            (settings, Some(e))
        }
    }
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within range; invalid values are ignored
/// with a warning (falling back to file/default).
pub fn apply_env_overrides(settings: &mut HookgateSettings) {
    // ── Phase gate ──────────────────────────────────────────────────
    if let Some(v) = read_env_string("HOOKGATE_PHASE_STATE") {
        settings.phase_gate.state_path = v;
    }
    if let Some(v) = read_env_i64("HOOKGATE_PHASE_TTL_MS", 1000, 7 * 24 * 3_600_000) {
        settings.phase_gate.ttl_ms = v;
    }

    // ── Heuristics ──────────────────────────────────────────────────
    if let Some(v) = read_env_string("HOOKGATE_HEURISTICS_STORE") {
        settings.heuristics.store_path = v;
    }
    if let Some(v) = read_env_i64("HOOKGATE_COOLDOWN_MS", 0, 24 * 3_600_000) {
        settings.heuristics.cooldown_ms = v;
    }
    if let Some(v) = read_env_i64("HOOKGATE_EDIT_WINDOW_MS", 1000, 24 * 3_600_000) {
        settings.heuristics.edit_window_ms = v;
    }
    if let Some(v) = read_env_u32("HOOKGATE_EDIT_THRESHOLD", 1, 1000) {
        settings.heuristics.edit_threshold = v;
    }
    if let Some(v) = read_env_string("HOOKGATE_STORE_PROGRAM") {
        settings.heuristics.store_program = v;
    }

    // ── Context injection ───────────────────────────────────────────
    if let Some(v) = read_env_string("HOOKGATE_RECALL_PROGRAM") {
        settings.context_injection.recall_program = v;
    }
    if let Some(v) = read_env_u64("HOOKGATE_RECALL_TIMEOUT_MS", 100, 600_000) {
        settings.context_injection.timeout_ms = v;
    }

    // ── Diagnostics ─────────────────────────────────────────────────
    if let Some(v) = read_env_string("HOOKGATE_REGISTRATION") {
        settings.diagnostics.registration_path = v;
    }
    if let Some(v) = read_env_string("HOOKGATE_ERROR_LOG") {
        settings.diagnostics.error_log_path = v;
    }
    if let Some(v) = read_env_string("CLAUDE_PROJECT_DIR") {
        if settings.diagnostics.project_dir.is_none() {
            settings.diagnostics.project_dir = Some(v);
        }
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("HOOKGATE_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as an `i64` within a range.
pub fn parse_i64_range(val: &str, min: i64, max: i64) -> Option<i64> {
    let n: i64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_i64(name: &str, min: i64, max: i64) -> Option<i64> {
    let val = std::env::var(name).ok()?;
    let result = parse_i64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid i64 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}
