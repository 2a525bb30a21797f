//! # parley-settings
//!
//! Layered configuration for Parley.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ParleySettings::default()`]
//! 2. **User file**: `~/.parley/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `PARLEY_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use parley_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("tool hop limit: {}", settings.runtime.max_tool_hops);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_env_overrides_with, deep_merge, load_settings,
    load_settings_from_path, load_settings_with_env, settings_path,
};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton, initialized on first access.
static SETTINGS: OnceLock<ParleySettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.parley/settings.json` with env var
/// overrides. If loading fails, the failure is logged and compiled defaults
/// are used.
pub fn get_settings() -> &'static ParleySettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load settings, using defaults");
            ParleySettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: ParleySettings) -> std::result::Result<(), ParleySettings> {
    SETTINGS.set(settings)
}
