//! # hookgate-settings
//!
//! Configuration with layered sources for hookgate.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HookgateSettings::default()`]
//! 2. **User file**: `~/.hookgate/settings.json` or `$HOOKGATE_SETTINGS`
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `HOOKGATE_*` overrides (highest priority)
//!
//! Path-valued settings may use `~`, `$HOME` and `${VAR}`; expand them with
//! [`expand_path`] at the point of use.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod paths;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, load_settings_or_default, settings_path};
pub use paths::{expand_path, expand_with, home_dir};
pub use types::*;
