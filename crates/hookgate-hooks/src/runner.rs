//! Fail-open hook execution.
//!
//! [`run_hook`] turns any [`HookInput`] into exactly one [`HookDecision`].
//! Malformed input, handler errors, timeouts and panics all become `allow`;
//! only a decision the handler actually returns can deny.

use std::sync::Arc;
use std::time::Duration;

use hookgate_core::{HookDecision, HookInput};
use tracing::{debug, error, warn};

use crate::handler::HookHandler;

/// Timeout applied when a handler does not declare one.
pub const DEFAULT_HOOK_TIMEOUT_MS: u64 = 30_000;

/// Run `handler` against `input` and return the decision to emit.
pub async fn run_hook(handler: Arc<dyn HookHandler>, input: HookInput, now_ms: i64) -> HookDecision {
    let event = match input {
        HookInput::WellFormed(event) => event,
        HookInput::Malformed { reason } => {
            debug!(name = %handler.name(), %reason, "malformed hook input, allowing");
            return HookDecision::allow();
        }
    };

    if !handler.should_handle(&event) {
        debug!(name = %handler.name(), kind = %event.action_kind, "event not handled, allowing");
        return HookDecision::allow();
    }

    let name = handler.name().to_string();
    let timeout_ms = handler.timeout_ms().unwrap_or(DEFAULT_HOOK_TIMEOUT_MS);

    let task = tokio::spawn(async move { handler.handle(&event, now_ms).await });

    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(Ok(decision))) => decision,
        Ok(Ok(Err(e))) => {
            error!(name = %name, error = %e, "hook handler error (fail-open)");
            HookDecision::allow()
        }
        Ok(Err(join_err)) => {
            error!(name = %name, error = %join_err, "hook handler panicked (fail-open)");
            HookDecision::allow()
        }
        Err(_) => {
            warn!(name = %name, timeout_ms, "hook handler timed out (fail-open)");
            HookDecision::allow()
        }
    }
}
