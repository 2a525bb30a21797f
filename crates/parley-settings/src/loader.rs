//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ParleySettings::default()`]
//! 2. If `~/.parley/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `PARLEY_*` environment variable overrides
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{BackendKind, BackendSettings, ParleySettings};

/// Resolve the path to the settings file (`~/.parley/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".parley").join("settings.json")
}

/// Load settings from the default path with process env overrides.
pub fn load_settings() -> Result<ParleySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with process env overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ParleySettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

/// Load settings from a specific path, reading overrides through `lookup`.
pub fn load_settings_with_env<F>(path: &Path, lookup: F) -> Result<ParleySettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(ParleySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ParleySettings = serde_json::from_value(merged)?;
    apply_env_overrides_with(&mut settings, lookup);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(settings: &mut ParleySettings) {
    apply_env_overrides_with(settings, |name| std::env::var(name).ok());
}

/// Apply overrides, reading variables through `lookup`.
///
/// Invalid values are logged and ignored (the file/default value is kept).
pub fn apply_env_overrides_with<F>(settings: &mut ParleySettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Logging / runtime ───────────────────────────────────────────
    if let Some(v) = env.string("PARLEY_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.u32_range("PARLEY_MAX_TOOL_HOPS", 1, 1_000) {
        settings.runtime.max_tool_hops = v;
    }
    if let Some(v) = env.bool("PARLEY_TRACK_USAGE") {
        settings.runtime.track_usage = v;
    }
    if let Some(v) = env.string("PARLEY_DEFAULT_BACKEND") {
        match serde_json::from_value::<BackendKind>(Value::String(v.clone())) {
            Ok(kind) => settings.default_backend = kind,
            Err(_) => warn!(key = "PARLEY_DEFAULT_BACKEND", value = %v, "unknown backend, ignoring"),
        }
    }

    // ── Backends ────────────────────────────────────────────────────
    env.backend("OPENAI", &mut settings.backends.openai);
    env.backend("ANTHROPIC", &mut settings.backends.anthropic);
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u32_range(&self, name: &str, min: u32, max: u32) -> Option<u32> {
        let val = (self.lookup)(name)?;
        let result = parse_u32_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u32 env var, ignoring");
        }
        result
    }

    fn backend(&self, prefix: &str, backend: &mut BackendSettings) {
        if let Some(v) = self.string(&format!("PARLEY_{prefix}_BASE_URL")) {
            backend.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = self.string(&format!("PARLEY_{prefix}_API_KEY_ENV")) {
            backend.api_key_env = v;
        }
        if let Some(v) = self.string(&format!("PARLEY_{prefix}_MODEL")) {
            backend.default_model = v;
        }
        if let Some(v) = self.string(&format!("PARLEY_{prefix}_API_VERSION")) {
            backend.api_version = Some(v);
        }
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within an inclusive range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;
    use crate::errors::SettingsError;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"runtime": {"maxToolHops": 16, "trackUsage": false}});
        let source = serde_json::json!({"runtime": {"maxToolHops": 4}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["runtime"]["maxToolHops"], 4);
        assert_eq!(merged["runtime"]["trackUsage"], false);
    }

    #[test]
    fn merge_null_preserves_target() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_array_replace() {
        let merged = deep_merge(
            serde_json::json!({"items": [1, 2, 3]}),
            serde_json::json!({"items": [4]}),
        );
        assert_eq!(merged["items"], serde_json::json!([4]));
    }

    #[test]
    fn merge_new_keys_added() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    // ── load_settings_with_env ──────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings =
            load_settings_with_env(Path::new("/nonexistent/settings.json"), no_env).unwrap();
        assert_eq!(settings, ParleySettings::default());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"defaultBackend": "anthropic", "backends": {"anthropic": {"defaultModel": "claude-opus-4-1"}}}"#,
        )
        .unwrap();

        let settings = load_settings_with_env(&path, no_env).unwrap();
        assert_eq!(settings.default_backend, BackendKind::Anthropic);
        assert_eq!(settings.backends.anthropic.default_model, "claude-opus-4-1");
        assert_eq!(
            settings.backends.anthropic.base_url,
            "https://api.anthropic.com/v1"
        );
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        assert_matches!(
            load_settings_with_env(&path, no_env),
            Err(SettingsError::Json(_))
        );
    }

    #[test]
    fn load_rejects_zero_hops_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"runtime": {"maxToolHops": 0}}"#).unwrap();

        assert_matches!(
            load_settings_with_env(&path, no_env),
            Err(SettingsError::InvalidValue(_))
        );
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"runtime": {"maxToolHops": 4}}"#).unwrap();

        let settings = load_settings_with_env(
            &path,
            env(&[("PARLEY_MAX_TOOL_HOPS", "9"), ("PARLEY_TRACK_USAGE", "yes")]),
        )
        .unwrap();
        assert_eq!(settings.runtime.max_tool_hops, 9);
        assert!(settings.runtime.track_usage);
    }

    // ── apply_env_overrides_with ────────────────────────────────────

    #[test]
    fn env_backend_fields() {
        let mut settings = ParleySettings::default();
        apply_env_overrides_with(
            &mut settings,
            env(&[
                ("PARLEY_DEFAULT_BACKEND", "anthropic"),
                ("PARLEY_OPENAI_BASE_URL", "http://localhost:8080/v1/"),
                ("PARLEY_OPENAI_MODEL", "gpt-4.1"),
                ("PARLEY_ANTHROPIC_API_VERSION", "2024-01-01"),
                ("PARLEY_ANTHROPIC_API_KEY_ENV", "MY_KEY"),
            ]),
        );
        assert_eq!(settings.default_backend, BackendKind::Anthropic);
        assert_eq!(settings.backends.openai.base_url, "http://localhost:8080/v1");
        assert_eq!(settings.backends.openai.default_model, "gpt-4.1");
        assert_eq!(
            settings.backends.anthropic.api_version.as_deref(),
            Some("2024-01-01")
        );
        assert_eq!(settings.backends.anthropic.api_key_env, "MY_KEY");
    }

    #[test]
    fn env_invalid_values_ignored() {
        let mut settings = ParleySettings::default();
        apply_env_overrides_with(
            &mut settings,
            env(&[
                ("PARLEY_MAX_TOOL_HOPS", "0"),
                ("PARLEY_TRACK_USAGE", "maybe"),
                ("PARLEY_DEFAULT_BACKEND", "gemini"),
                ("PARLEY_LOG_LEVEL", ""),
            ]),
        );
        assert_eq!(settings, ParleySettings::default());
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for v in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "No", "off"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn parse_u32_range_bounds() {
        assert_eq!(parse_u32_range("1", 1, 10), Some(1));
        assert_eq!(parse_u32_range("10", 1, 10), Some(10));
        assert_eq!(parse_u32_range("11", 1, 10), None);
        assert_eq!(parse_u32_range("-1", 1, 10), None);
        assert_eq!(parse_u32_range("abc", 1, 10), None);
    }

    #[test]
    fn settings_path_under_parley_dir() {
        let path = settings_path();
        assert!(path.ends_with(".parley/settings.json"));
    }
}
