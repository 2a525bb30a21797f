//! API error body parsing shared by every backend.
//!
//! Handles these envelopes:
//! - Standard: `{"error": {"message": "...", "type": "..."}}`
//! - Detail:   `{"detail": "..."}`
//! - Flat:     `{"message": "...", "code": "..."}`

use serde_json::Value;

/// Parsed API error information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Backend-specific error code (e.g. `"overloaded_error"`).
    pub code: Option<String>,
    /// Whether the request can be retried (429 or 5xx).
    pub retryable: bool,
}

/// Parse an API error response body, falling back to the raw text.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    let retryable = status == 429 || status >= 500;

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            let code = json["error"]["type"]
                .as_str()
                .or_else(|| json["error"]["code"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
                retryable,
            };
        }

        if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
            let code = json["code"]
                .as_str()
                .or_else(|| json["type"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
                retryable,
            };
        }
    }

    ApiErrorInfo {
        message: format!("HTTP {status}: {body}"),
        code: None,
        retryable,
    }
}
