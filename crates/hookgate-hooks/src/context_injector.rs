//! Plan-mode context injection.
//!
//! When the assistant enters planning mode, ask the recall collaborator for
//! past learnings and inject what it returns as additional context. Every
//! outcome is allow; a failed or empty recall just injects nothing.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hookgate_core::{ActionEvent, HookDecision};
use hookgate_settings::{ContextInjectionSettings, expand_path};
use tracing::{debug, warn};

use crate::errors::HookError;
use crate::handler::HookHandler;

/// Source of recalled learnings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecallClient: Send + Sync {
    /// Free-form text for `query`, at most `limit` results.
    async fn recall(&self, query: &str, limit: u32) -> Result<String, HookError>;
}

/// Recall through an external command.
///
/// Runs `<program> <args...> --query <q> --k <n> [--text-only]` and returns
/// its stdout. A nonzero exit or a timeout is an error.
#[derive(Clone, Debug)]
pub struct SubprocessRecall {
    program: String,
    args: Vec<String>,
    text_only: bool,
    timeout_ms: u64,
}

impl SubprocessRecall {
    /// Command taken from settings, with `~` and `$VAR` expanded in args.
    pub fn from_settings(settings: &ContextInjectionSettings) -> Self {
        Self {
            program: settings.recall_program.clone(),
            args: settings
                .recall_args
                .iter()
                .map(|a| expand_path(a).to_string_lossy().into_owned())
                .collect(),
            text_only: settings.text_only,
            timeout_ms: settings.timeout_ms,
        }
    }

    /// Full argument list for one call.
    pub fn command_args(&self, query: &str, limit: u32) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--query".to_string(),
            query.to_string(),
            "--k".to_string(),
            limit.to_string(),
        ]);
        if self.text_only {
            args.push("--text-only".to_string());
        }
        args
    }
}

#[async_trait]
impl RecallClient for SubprocessRecall {
    async fn recall(&self, query: &str, limit: u32) -> Result<String, HookError> {
        let start = Instant::now();

        let mut cmd = tokio::process::Command::new(&self.program);
        let _ = cmd
            .args(self.command_args(query, limit))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %self.program, limit, "spawning recall");

        let child = cmd
            .spawn()
            .map_err(|e| HookError::Recall(format!("failed to spawn {}: {e}", self.program)))?;

        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|e| HookError::Recall(format!("recall wait failed: {e}")))?
            }
            () = tokio::time::sleep(Duration::from_millis(self.timeout_ms)) => {
                return Err(HookError::Timeout {
                    name: self.program.clone(),
                    timeout_ms: self.timeout_ms,
                });
            }
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HookError::Recall(format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        debug!(duration_ms, bytes = output.stdout.len(), "recall completed");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Truncate to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The plan-context hook.
pub struct ContextInjector {
    settings: ContextInjectionSettings,
    client: Box<dyn RecallClient>,
}

impl ContextInjector {
    /// Injector backed by the configured recall command.
    pub fn new(settings: ContextInjectionSettings) -> Self {
        let client = Box::new(SubprocessRecall::from_settings(&settings));
        Self::with_client(settings, client)
    }

    /// Injector backed by `client`.
    pub fn with_client(settings: ContextInjectionSettings, client: Box<dyn RecallClient>) -> Self {
        Self { settings, client }
    }

    /// The context to inject for a recall response, if it qualifies.
    pub fn qualify(&self, response: &str) -> Option<String> {
        let trimmed = response.trim();
        if trimmed.to_lowercase().starts_with("no results") {
            return None;
        }
        if trimmed.chars().count() <= self.settings.min_response_chars {
            return None;
        }
        Some(truncate_chars(trimmed, self.settings.max_context_chars).to_string())
    }
}

#[async_trait]
impl HookHandler for ContextInjector {
    fn name(&self) -> &str {
        "plan-context"
    }

    fn timeout_ms(&self) -> Option<u64> {
        // Slack over the recall timeout so the subprocess race decides first.
        Some(self.settings.timeout_ms.saturating_add(1000))
    }

    fn should_handle(&self, event: &ActionEvent) -> bool {
        event.action_kind == self.settings.trigger_action
    }

    async fn handle(&self, _event: &ActionEvent, _now_ms: i64) -> Result<HookDecision, HookError> {
        let response = match self
            .client
            .recall(&self.settings.query, self.settings.limit)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "recall unavailable, no context injected");
                return Ok(HookDecision::allow());
            }
        };

        Ok(match self.qualify(&response) {
            Some(context) => {
                debug!(chars = context.chars().count(), "injecting recalled context");
                HookDecision::allow_with_context(context)
            }
            None => HookDecision::allow(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookgate_core::HookInput;
    use serde_json::json;
    use std::sync::Arc;

    fn plan_event() -> ActionEvent {
        ActionEvent::new("EnterPlanMode", json!({})).with_session("s1")
    }

    fn injector_returning(response: Result<String, HookError>) -> ContextInjector {
        let mut mock = MockRecallClient::new();
        let _ = mock
            .expect_recall()
            .withf(|query, limit| query.contains("planning") && *limit == 3)
            .times(1)
            .return_once(move |_, _| response);
        ContextInjector::with_client(ContextInjectionSettings::default(), Box::new(mock))
    }

    // --- qualify / truncate ---

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn long_response_truncated_to_limit() {
        let injector = injector_returning(Ok("x".repeat(2000)));
        let decision = injector.handle(&plan_event(), 0).await.unwrap();
        assert!(!decision.is_denied());
        assert_eq!(decision.additional_context.unwrap().chars().count(), 1500);
    }

    #[tokio::test]
    async fn multibyte_response_truncated_on_char_boundary() {
        let injector = injector_returning(Ok("é".repeat(2000)));
        let context = injector.handle(&plan_event(), 0).await.unwrap().additional_context.unwrap();
        assert_eq!(context.chars().count(), 1500);
    }

    #[tokio::test]
    async fn no_results_injects_nothing() {
        let injector = injector_returning(Ok("No results found for your query.\n".into()));
        let decision = injector.handle(&plan_event(), 0).await.unwrap();
        assert_eq!(decision, HookDecision::allow());
    }

    #[tokio::test]
    async fn short_response_injects_nothing() {
        let injector = injector_returning(Ok("exactly twenty chars".into()));
        assert_eq!("exactly twenty chars".len(), 20);
        let decision = injector.handle(&plan_event(), 0).await.unwrap();
        assert_eq!(decision, HookDecision::allow());
    }

    #[tokio::test]
    async fn qualifying_response_injected_trimmed() {
        let text = "Use the repository pattern for storage access.";
        let injector = injector_returning(Ok(format!("\n{text}\n\n")));
        let decision = injector.handle(&plan_event(), 0).await.unwrap();
        assert_eq!(decision.additional_context.as_deref(), Some(text));
    }

    #[tokio::test]
    async fn recall_failure_allows() {
        let injector = injector_returning(Err(HookError::Recall("exit code 1".into())));
        assert_eq!(injector.handle(&plan_event(), 0).await.unwrap(), HookDecision::allow());
    }

    #[tokio::test]
    async fn recall_timeout_allows() {
        let injector = injector_returning(Err(HookError::Timeout {
            name: "uv".into(),
            timeout_ms: 5000,
        }));
        assert_eq!(injector.handle(&plan_event(), 0).await.unwrap(), HookDecision::allow());
    }

    // --- triggering ---

    #[tokio::test]
    async fn other_actions_never_call_recall() {
        let mut mock = MockRecallClient::new();
        let _ = mock.expect_recall().times(0);
        let injector = Arc::new(ContextInjector::with_client(
            ContextInjectionSettings::default(),
            Box::new(mock),
        ));
        let input = HookInput::WellFormed(ActionEvent::new("Edit", json!({})));
        let decision = crate::runner::run_hook(injector, input, 0).await;
        assert_eq!(decision, HookDecision::allow());
    }

    #[tokio::test]
    async fn malformed_input_never_calls_recall() {
        let mut mock = MockRecallClient::new();
        let _ = mock.expect_recall().times(0);
        let injector = Arc::new(ContextInjector::with_client(
            ContextInjectionSettings::default(),
            Box::new(mock),
        ));
        let decision = crate::runner::run_hook(injector, HookInput::parse(""), 0).await;
        assert_eq!(decision, HookDecision::allow());
    }

    // --- SubprocessRecall ---

    fn shell_recall(script: &str, timeout_ms: u64) -> SubprocessRecall {
        SubprocessRecall::from_settings(&ContextInjectionSettings {
            recall_program: "sh".into(),
            recall_args: vec!["-c".into(), script.into(), "sh".into()],
            timeout_ms,
            ..ContextInjectionSettings::default()
        })
    }

    #[test]
    fn command_args_follow_recall_contract() {
        let recall = SubprocessRecall::from_settings(&ContextInjectionSettings {
            recall_args: vec!["recall.py".into()],
            ..ContextInjectionSettings::default()
        });
        assert_eq!(
            recall.command_args("q", 3),
            vec!["recall.py", "--query", "q", "--k", "3", "--text-only"]
        );
    }

    #[tokio::test]
    async fn subprocess_returns_stdout() {
        let recall = shell_recall(r#"printf '%s ' "$@""#, 5000);
        let out = recall.recall("auth flow", 2).await.unwrap();
        assert_eq!(out.trim(), "--query auth flow --k 2 --text-only");
    }

    #[tokio::test]
    async fn subprocess_nonzero_exit_is_error() {
        let recall = shell_recall("echo oops >&2; exit 3", 5000);
        let err = recall.recall("q", 1).await.unwrap_err();
        assert!(err.to_string().contains("exit code 3"));
    }

    #[tokio::test]
    async fn subprocess_timeout_is_error() {
        let recall = shell_recall("sleep 5", 100);
        let start = Instant::now();
        let err = recall.recall("q", 1).await.unwrap_err();
        assert!(matches!(err, HookError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn missing_program_is_error() {
        let recall = SubprocessRecall::from_settings(&ContextInjectionSettings {
            recall_program: "/nonexistent/hookgate-recall".into(),
            ..ContextInjectionSettings::default()
        });
        assert!(matches!(recall.recall("q", 1).await, Err(HookError::Recall(_))));
    }
}
