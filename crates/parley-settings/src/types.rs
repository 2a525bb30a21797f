//! Settings type definitions.
//!
//! All types use camelCase JSON keys and `#[serde(default)]`, so a partial
//! settings file only needs the values it changes.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Backend family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// `OpenAI` Chat Completions.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Messages.
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl BackendKind {
    /// Settings key for this backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root settings type.
///
/// ```json
/// {
///   "runtime": { "maxToolHops": 8, "trackUsage": true },
///   "defaultBackend": "anthropic",
///   "backends": { "anthropic": { "defaultModel": "claude-sonnet-4-5" } }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParleySettings {
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Tool loop and streaming configuration.
    pub runtime: RuntimeSettings,
    /// Backend used when the caller does not pick one.
    pub default_backend: BackendKind,
    /// Per-backend connection settings.
    pub backends: BackendsSettings,
}

impl ParleySettings {
    /// Connection settings for one backend.
    pub fn backend(&self, kind: BackendKind) -> &BackendSettings {
        match kind {
            BackendKind::OpenAi => &self.backends.openai,
            BackendKind::Anthropic => &self.backends.anthropic,
        }
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.runtime.max_tool_hops == 0 {
            return Err(SettingsError::InvalidValue(
                "runtime.maxToolHops must be at least 1".into(),
            ));
        }
        for kind in [BackendKind::OpenAi, BackendKind::Anthropic] {
            if self.backend(kind).base_url.is_empty() {
                return Err(SettingsError::InvalidValue(format!(
                    "backends.{kind}.baseUrl must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Tool loop and streaming configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeSettings {
    /// Tool round trips allowed per turn before the turn fails.
    pub max_tool_hops: u32,
    /// Default for `CompletionOptions::track_usage` in factory-built completers.
    pub track_usage: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_tool_hops: 16,
            track_usage: false,
        }
    }
}

/// Connection settings for every backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendsSettings {
    /// `OpenAI` settings.
    pub openai: BackendSettings,
    /// Anthropic settings.
    pub anthropic: BackendSettings,
}

impl Default for BackendsSettings {
    fn default() -> Self {
        Self {
            openai: BackendSettings {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                default_model: "gpt-4o".to_string(),
                api_version: None,
            },
            anthropic: BackendSettings {
                base_url: "https://api.anthropic.com/v1".to_string(),
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
                default_model: "claude-sonnet-4-5".to_string(),
                api_version: Some("2023-06-01".to_string()),
            },
        }
    }
}

/// Connection settings for one backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model used when the caller passes none.
    pub default_model: String,
    /// API version header value (Anthropic only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}
