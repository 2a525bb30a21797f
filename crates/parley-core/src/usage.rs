//! Token usage accounting.
//!
//! Usage accumulates across tool round trips by field-wise addition. Counters
//! are unsigned and additions saturate, so a running total never decreases.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Optional detail counters reported by some backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageDetails {
    /// Prompt tokens served from cache.
    #[serde(default)]
    pub cached_tokens: u64,
    /// Audio tokens.
    #[serde(default)]
    pub audio_tokens: u64,
    /// Hidden reasoning tokens.
    #[serde(default)]
    pub reasoning_tokens: u64,
}

impl Add for UsageDetails {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cached_tokens: self.cached_tokens.saturating_add(rhs.cached_tokens),
            audio_tokens: self.audio_tokens.saturating_add(rhs.audio_tokens),
            reasoning_tokens: self.reasoning_tokens.saturating_add(rhs.reasoning_tokens),
        }
    }
}

/// Prompt and completion counters for one call or a whole turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    /// Input tokens.
    pub prompt_tokens: u64,
    /// Output tokens.
    pub completion_tokens: u64,
    /// Detail counters, when any hop reported them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<UsageDetails>,
}

impl UsageStats {
    /// Create usage with the two main counters.
    #[must_use]
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            details: None,
        }
    }

    /// Attach detail counters.
    #[must_use]
    pub fn with_details(mut self, details: UsageDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Sum of prompt and completion tokens.
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }

    /// Add one hop's usage into this running total.
    pub fn accumulate(&mut self, hop: &Self) {
        *self += *hop;
    }
}

impl Add for UsageStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let details = match (self.details, rhs.details) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or_default() + b.unwrap_or_default()),
        };
        Self {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            details,
        }
    }
}

impl AddAssign for UsageStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
