//! Settings-driven adapter construction.

use std::sync::Arc;

use parley_llm::{ProviderError, VendorAdapter};
use parley_llm_anthropic::AnthropicAdapter;
use parley_llm_openai::OpenAiAdapter;
use parley_settings::{BackendKind, ParleySettings};
use tracing::debug;

use crate::errors::RuntimeError;

/// `anthropic-version` header sent when settings leave it unset.
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

/// Build the adapter for `kind`, reading its API key from the environment.
pub fn build_adapter(settings: &ParleySettings, kind: BackendKind) -> Result<Arc<dyn VendorAdapter>, RuntimeError> {
    build_adapter_with(settings, kind, |name| std::env::var(name).ok())
}

/// Build the adapter for `kind` with a custom environment lookup.
pub fn build_adapter_with<F>(
    settings: &ParleySettings,
    kind: BackendKind,
    lookup: F,
) -> Result<Arc<dyn VendorAdapter>, RuntimeError>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = settings.backend(kind);
    let api_key = lookup(&backend.api_key_env)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ProviderError::Auth {
            message: format!("{} is not set", backend.api_key_env),
        })?;
    debug!(backend = %kind, base_url = %backend.base_url, "building adapter");

    let adapter: Arc<dyn VendorAdapter> = match kind {
        BackendKind::OpenAi => Arc::new(OpenAiAdapter::with_api_key(&backend.base_url, &api_key)?),
        BackendKind::Anthropic => {
            let version = backend.api_version.as_deref().unwrap_or(DEFAULT_ANTHROPIC_VERSION);
            Arc::new(AnthropicAdapter::with_api_key(&backend.base_url, &api_key, version)?)
        }
    };
    Ok(adapter)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
