//! Health classification.

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactStatus;
use crate::registration::HookRegistration;

/// Overall hook health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Everything present, no recent errors.
    Healthy,
    /// A source artifact is missing, or some errors occurred recently.
    Degraded,
    /// A built hook is missing its runnable, or errors are frequent.
    Unhealthy,
}

impl HealthStatus {
    /// Upper-case label for text output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Degraded => "DEGRADED",
            Self::Unhealthy => "UNHEALTHY",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A registered hook and its artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookStatus {
    /// Registration record.
    #[serde(flatten)]
    pub registration: HookRegistration,
    /// Resolved artifacts.
    #[serde(flatten)]
    pub artifacts: ArtifactStatus,
}

impl HookStatus {
    /// `name (Event:matcher)` as used in issue text.
    pub fn label(&self) -> String {
        match &self.registration.matcher {
            Some(matcher) if !matcher.is_empty() => format!(
                "{} ({}:{})",
                self.artifacts.name, self.registration.event, matcher
            ),
            _ => format!("{} ({})", self.artifacts.name, self.registration.event),
        }
    }
}

fn error_count(n: usize) -> String {
    if n == 1 {
        "1 error".to_string()
    } else {
        format!("{n} errors")
    }
}

/// Classify hooks and the recent error count into a status plus issues.
pub fn classify(hooks: &[HookStatus], recent_errors: usize, unhealthy_threshold: usize) -> (HealthStatus, Vec<String>) {
    let mut status = HealthStatus::Healthy;
    let mut issues = Vec::new();

    for hook in hooks {
        let art = &hook.artifacts;
        if art.source_exists && !art.runnable_exists {
            status = status.max(HealthStatus::Unhealthy);
            issues.push(format!(
                "{}: runnable missing at {} (source present, rebuild needed)",
                hook.label(),
                art.runnable.as_deref().unwrap_or("<unresolved>")
            ));
        } else if !art.source_exists {
            status = status.max(HealthStatus::Degraded);
            issues.push(format!(
                "{}: source missing at {}",
                hook.label(),
                art.source.as_deref().unwrap_or("<unresolved>")
            ));
        }
    }

    if recent_errors > unhealthy_threshold {
        status = status.max(HealthStatus::Unhealthy);
        issues.push(format!(
            "{} in the last hour (more than {unhealthy_threshold})",
            error_count(recent_errors)
        ));
    } else if recent_errors > 0 {
        status = status.max(HealthStatus::Degraded);
        issues.push(format!("{} in the last hour", error_count(recent_errors)));
    }

    (status, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(runnable_exists: bool, source_exists: bool) -> HookStatus {
        HookStatus {
            registration: HookRegistration {
                event: "PreToolUse".into(),
                matcher: Some("Task".into()),
                command: "node /h/dist/phase-gate.mjs".into(),
                timeout: Some(10),
            },
            artifacts: ArtifactStatus {
                name: "phase-gate.mjs".into(),
                runnable: Some("/h/dist/phase-gate.mjs".into()),
                source: Some("/h/src/phase-gate.ts".into()),
                runnable_exists,
                source_exists,
            },
        }
    }

    #[test]
    fn empty_is_healthy() {
        let (status, issues) = classify(&[], 0, 10);
        assert_eq!(status, HealthStatus::Healthy);
        assert!(issues.is_empty());
    }

    #[test]
    fn missing_runnable_with_source_is_unhealthy() {
        let (status, issues) = classify(&[hook(false, true)], 0, 10);
        assert_eq!(status, HealthStatus::Unhealthy);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("phase-gate.mjs (PreToolUse:Task)"));
    }

    #[test]
    fn missing_source_is_degraded() {
        let (status, issues) = classify(&[hook(true, false)], 0, 10);
        assert_eq!(status, HealthStatus::Degraded);
        assert!(issues[0].contains("source missing"));
    }

    #[test]
    fn both_missing_is_degraded() {
        assert_eq!(classify(&[hook(false, false)], 0, 10).0, HealthStatus::Degraded);
    }

    #[test]
    fn error_thresholds() {
        assert_eq!(classify(&[], 1, 10).0, HealthStatus::Degraded);
        assert_eq!(classify(&[], 10, 10).0, HealthStatus::Degraded);
        assert_eq!(classify(&[], 11, 10).0, HealthStatus::Unhealthy);
    }

    #[test]
    fn error_issue_text_is_pluralized() {
        assert_eq!(classify(&[], 1, 10).1, vec!["1 error in the last hour".to_string()]);
        assert_eq!(classify(&[], 2, 10).1, vec!["2 errors in the last hour".to_string()]);
        assert_eq!(
            classify(&[], 11, 10).1,
            vec!["11 errors in the last hour (more than 10)".to_string()]
        );
    }

    #[test]
    fn worst_condition_wins() {
        let (status, issues) = classify(&[hook(true, false), hook(false, true)], 3, 10);
        assert_eq!(status, HealthStatus::Unhealthy);
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(HealthStatus::Unhealthy).unwrap(), "unhealthy");
        assert_eq!(HealthStatus::Degraded.to_string(), "DEGRADED");
    }
}
