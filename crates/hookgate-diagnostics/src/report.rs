//! Report assembly and rendering.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use hookgate_settings::{DiagnosticsSettings, expand_path};
use serde::Serialize;
use tracing::warn;

use crate::artifacts::{CommandEnv, resolve_artifacts};
use crate::error_log::{ErrorEntry, load_error_log};
use crate::health::{HealthStatus, HookStatus, classify};
use crate::registration::load_registrations;

/// Output shape selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Status, inventory, errors and issues as text.
    #[default]
    Full,
    /// Error section only.
    Errors,
    /// Hook inventory only.
    Inventory,
    /// The whole report as JSON.
    Json,
}

/// Error log summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    /// Entries read from the log tail.
    pub total: usize,
    /// Entries within the recent window.
    pub last_hour: usize,
    /// The entries, oldest first.
    pub entries: Vec<ErrorEntry>,
}

/// The full diagnostics report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Generation time, RFC 3339.
    pub generated_at: String,
    /// Registered hooks.
    pub hooks: Vec<HookStatus>,
    /// Error log summary.
    pub errors: ErrorSummary,
    /// Human-readable problems, empty when healthy.
    pub issues: Vec<String>,
}

/// Build the report from the configured artifacts. Never fails.
pub fn build_report(settings: &DiagnosticsSettings, env: &CommandEnv, now: DateTime<Utc>) -> DiagnosticsReport {
    let registration_path = expand_path(&settings.registration_path);
    let error_log_path = expand_path(&settings.error_log_path);
    build_report_from(settings, &registration_path, &error_log_path, env, now)
}

/// Build the report from explicit artifact paths.
pub fn build_report_from(
    settings: &DiagnosticsSettings,
    registration_path: &Path,
    error_log_path: &Path,
    env: &CommandEnv,
    now: DateTime<Utc>,
) -> DiagnosticsReport {
    let mut registration_issue = None;
    let registrations = match load_registrations(registration_path) {
        Ok(regs) => regs,
        Err(e) => {
            warn!(path = %registration_path.display(), error = %e, "registration file unusable");
            registration_issue = Some(format!(
                "registration file {} unusable: {e}",
                registration_path.display()
            ));
            Vec::new()
        }
    };

    let hooks: Vec<HookStatus> = registrations
        .into_iter()
        .map(|registration| {
            let artifacts = resolve_artifacts(&registration.command, env);
            HookStatus {
                registration,
                artifacts,
            }
        })
        .collect();

    let entries = load_error_log(error_log_path, settings.max_log_lines);
    let last_hour = entries
        .iter()
        .filter(|e| e.is_recent(now, settings.recent_window_ms))
        .count();

    let (mut status, mut issues) = classify(&hooks, last_hour, settings.unhealthy_error_threshold);
    if let Some(issue) = registration_issue {
        status = status.max(HealthStatus::Degraded);
        issues.insert(0, issue);
    }

    DiagnosticsReport {
        status,
        generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        hooks,
        errors: ErrorSummary {
            total: entries.len(),
            last_hour,
            entries,
        },
        issues,
    }
}

fn presence(exists: bool) -> &'static str {
    if exists { "present" } else { "MISSING" }
}

fn render_inventory(out: &mut String, report: &DiagnosticsReport) {
    let _ = writeln!(out, "Hooks ({}):", report.hooks.len());
    if report.hooks.is_empty() {
        let _ = writeln!(out, "  (none registered)");
    }
    for hook in &report.hooks {
        let art = &hook.artifacts;
        let mark = if art.runnable_exists && art.source_exists { "ok" } else { "!!" };
        let timeout = hook
            .registration
            .timeout
            .map_or_else(String::new, |t| format!("  timeout {t}s"));
        let _ = writeln!(out, "  [{mark}] {}{timeout}", hook.label());
        let _ = writeln!(out, "       command:  {}", hook.registration.command);
        if let Some(runnable) = &art.runnable {
            let _ = writeln!(out, "       runnable: {runnable} ({})", presence(art.runnable_exists));
        }
        if let Some(source) = &art.source {
            if art.source != art.runnable {
                let _ = writeln!(out, "       source:   {source} ({})", presence(art.source_exists));
            }
        }
    }
}

fn render_errors(out: &mut String, report: &DiagnosticsReport) {
    let _ = writeln!(
        out,
        "Errors: {} in log tail, {} in the last hour",
        report.errors.total, report.errors.last_hour
    );
    for entry in &report.errors.entries {
        let _ = writeln!(out, "  {}  {}", entry.timestamp, entry.message);
    }
}

fn render_issues(out: &mut String, report: &DiagnosticsReport) {
    if report.issues.is_empty() {
        let _ = writeln!(out, "Issues: none");
        return;
    }
    let _ = writeln!(out, "Issues ({}):", report.issues.len());
    for issue in &report.issues {
        let _ = writeln!(out, "  - {issue}");
    }
}

/// Render the report in the selected mode.
pub fn render(report: &DiagnosticsReport, mode: OutputMode) -> String {
    let mut out = String::new();
    match mode {
        OutputMode::Json => {
            out = serde_json::to_string_pretty(report).unwrap_or_else(|e| {
                warn!(error = %e, "failed to encode report");
                format!("{{\"status\":\"{}\"}}", report.status.label().to_lowercase())
            });
            out.push('\n');
        }
        OutputMode::Errors => render_errors(&mut out, report),
        OutputMode::Inventory => render_inventory(&mut out, report),
        OutputMode::Full => {
            let _ = writeln!(out, "Hook health: {} ({})", report.status, report.generated_at);
            out.push('\n');
            render_inventory(&mut out, report);
            out.push('\n');
            render_errors(&mut out, report);
            out.push('\n');
            render_issues(&mut out, report);
        }
    }
    out
}
