//! # hookgate-core
//!
//! The hook contract shared by every hookgate component.
//!
//! - **Events**: [`ActionEvent`](types::ActionEvent), decoded from stdin into the
//!   [`HookInput`](types::HookInput) sum type (`WellFormed` / `Malformed`)
//! - **Decisions**: [`HookDecision`](types::HookDecision) with an allow/deny
//!   [`Verdict`](types::Verdict), an optional reason and optional injected context
//! - **I/O**: bounded stdin reads and single-document decision output
//! - **State**: JSON state files that load as `Missing | Loaded | Corrupt` and
//!   save through temp-file + rename
//! - **Logging**: stderr `tracing` subscriber plus an error-log layer
//!
//! ## Fail-Open
//!
//! Nothing in this crate panics on bad input. Malformed events, unreadable
//! state and output failures all degrade to the most permissive outcome.

#![deny(unsafe_code)]

pub mod clock;
pub mod errors;
pub mod io;
pub mod logging;
pub mod state;
pub mod types;

pub use errors::StateError;
pub use types::{ActionEvent, HookDecision, HookInput, Verdict};
