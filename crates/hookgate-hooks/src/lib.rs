//! # hookgate-hooks
//!
//! The pre-action hooks and the runner that drives them.
//!
//! - [`PhaseGate`](phase_gate::PhaseGate): denies delegated sub-tasks that the
//!   current workflow phase does not permit
//! - [`LearningReminder`](heuristics::LearningReminder): per-session rolling
//!   heuristics that suggest storing an insight
//! - [`ContextInjector`](context_injector::ContextInjector): injects recalled
//!   learnings when planning starts
//!
//! ## Fail-Open
//!
//! Hook errors never block the host. [`run_hook`](runner::run_hook) logs
//! them and allows the action. Only a legitimate phase mismatch denies.

#![deny(unsafe_code)]

pub mod context_injector;
pub mod errors;
pub mod handler;
pub mod heuristics;
pub mod phase_gate;
pub mod runner;

pub use context_injector::{ContextInjector, RecallClient, SubprocessRecall};
pub use errors::HookError;
pub use handler::HookHandler;
pub use heuristics::LearningReminder;
pub use phase_gate::{Phase, PhaseGate, PhaseGateState};
pub use runner::run_hook;
