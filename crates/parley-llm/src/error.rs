//! Backend error type.

/// Result type alias for backend operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised by transports and adapters.
///
/// These propagate unchanged to the caller and abort the turn; the core never
/// retries. [`is_retryable`](Self::is_retryable) is informational for callers
/// that implement their own policy.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SSE stream parsing or reading failed.
    #[error("SSE parse error: {message}")]
    SseParse {
        /// Error description.
        message: String,
    },

    /// Authentication failed (missing or rejected key).
    #[error("Auth error: {message}")]
    Auth {
        /// Error description.
        message: String,
    },

    /// Backend returned a non-success response or an in-stream error event.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code (0 for in-stream errors).
        status: u16,
        /// Error description.
        message: String,
        /// Backend-specific error code.
        code: Option<String>,
        /// Whether this error can be retried.
        retryable: bool,
    },

    /// A native response or chunk did not have the expected shape.
    #[error("unexpected response: {message}")]
    UnexpectedResponse {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Whether the same request could succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::Api { retryable, .. } => *retryable,
            Self::SseParse { .. }
            | Self::Auth { .. }
            | Self::Json(_)
            | Self::UnexpectedResponse { .. } => false,
        }
    }

    /// Error category string for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) | Self::SseParse { .. } | Self::UnexpectedResponse { .. } => "parse",
            Self::Auth { .. } => "auth",
            Self::Api { status: 429, .. } => "rate_limit",
            Self::Api { .. } => "api",
        }
    }

    /// Shorthand for [`ProviderError::UnexpectedResponse`].
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }
}
