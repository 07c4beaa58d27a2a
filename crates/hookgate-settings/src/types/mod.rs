//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file may name only the values it changes. Every tuning
//! constant the hooks use lives here with its production default.

mod context;
mod diagnostics;
mod heuristics;
mod phase_gate;

pub use context::*;
pub use diagnostics::*;
pub use heuristics::*;
pub use phase_gate::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// Loaded from `~/.hookgate/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "phaseGate": { "ttlMs": 7200000 },
///   "heuristics": { "editThreshold": 4 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HookgateSettings {
    /// Workflow phase gate.
    pub phase_gate: PhaseGateSettings,
    /// Learning-reminder heuristics.
    pub heuristics: HeuristicSettings,
    /// Plan-mode context injection.
    pub context_injection: ContextInjectionSettings,
    /// Health diagnostics.
    pub diagnostics: DiagnosticsSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default stderr filter when no env filter is set.
    pub level: String,
    /// Append `ERROR` events to [`DiagnosticsSettings::error_log_path`].
    pub write_error_log: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            write_error_log: true,
        }
    }
}
