//! # hookgate-diagnostics
//!
//! Offline health report for installed hooks, for human consumption.
//!
//! Reads two artifacts left behind by the rest of the system and never
//! writes to either:
//!
//! - the host's hook registration file, resolved to runnable and source
//!   artifacts on disk ([`artifacts`])
//! - the tail of the shared error log ([`error_log`])
//!
//! and classifies them as `healthy`, `degraded` or `unhealthy`
//! ([`health`]). [`report`] renders the result as text or JSON.

#![deny(unsafe_code)]

pub mod artifacts;
pub mod error_log;
pub mod errors;
pub mod health;
pub mod registration;
pub mod report;

pub use artifacts::CommandEnv;
pub use errors::DiagnosticsError;
pub use health::HealthStatus;
pub use report::{DiagnosticsReport, OutputMode, build_report, render};

use chrono::Utc;
use hookgate_settings::DiagnosticsSettings;

/// Build and render the report against the live environment.
pub fn diagnose(settings: &DiagnosticsSettings, mode: OutputMode) -> String {
    let env = CommandEnv::from_process(settings.project_dir.as_deref());
    let report = build_report(settings, &env, Utc::now());
    render(&report, mode)
}
