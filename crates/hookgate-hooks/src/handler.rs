//! Hook handler trait.
//!
//! Every hook (phase gate, learning reminder, plan context) implements
//! [`HookHandler`] and is driven by [`run_hook`](crate::runner::run_hook).

use async_trait::async_trait;
use hookgate_core::{ActionEvent, HookDecision};

use crate::errors::HookError;

/// A pre-action hook.
///
/// Handlers inspect one [`ActionEvent`] and return a [`HookDecision`]. Only
/// the phase gate ever denies; the other hooks allow and may add context.
///
/// # Filtering
///
/// Override [`should_handle`](HookHandler::should_handle) to skip events the
/// handler has no opinion on. Skipped events are allowed without calling
/// [`handle`](HookHandler::handle).
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Unique name for this handler, used in logs.
    fn name(&self) -> &str;

    /// Optional timeout in milliseconds. Default: 30 seconds.
    fn timeout_ms(&self) -> Option<u64> {
        None
    }

    /// Return `false` to allow the event without handling it.
    fn should_handle(&self, _event: &ActionEvent) -> bool {
        true
    }

    /// Compute the decision for one event at `now_ms` (epoch milliseconds).
    ///
    /// Errors are caught by the runner and treated as allow (fail-open).
    async fn handle(&self, event: &ActionEvent, now_ms: i64) -> Result<HookDecision, HookError>;
}
