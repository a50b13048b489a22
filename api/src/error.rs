//! Error types for the request pipeline
//!
//! Any failure is normalized into one [`ApiError`] before signals are emitted.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Normalized request failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request did not complete within the configured time limit
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection, DNS or protocol failure before a response arrived
    #[error("Request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// User-facing message taken from the body when it carries one
        message: String,
        /// Response body (`Null` when empty)
        body: Value,
    },

    /// A success response whose body is not valid JSON
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The request body could not be serialized
    #[error("Request body serialization failed: {0}")]
    Serialization(String),

    /// The request could not be built (unresolvable URL or bad header)
    #[error("Invalid request: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build a status error, lifting `message` (or `error`) out of a JSON body
    #[must_use]
    pub fn status(status: u16, body: Value) -> Self {
        let message = ["message", "error"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str))
            .map_or_else(|| default_reason(status), str::to_string);

        Self::Status {
            status,
            message,
            body,
        }
    }

    /// Normalize a reqwest failure
    #[must_use]
    pub fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else if error.is_builder() {
            Self::InvalidUrl(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }

    /// HTTP status, if the API answered
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, if the API answered with one
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } if !body.is_null() => Some(body),
            _ => None,
        }
    }

    /// Whether the failure was the overall time limit
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Text suitable for a user-facing notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn default_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_message_from_body() {
        let error = ApiError::status(422, json!({ "message": "Email already taken" }));
        assert_eq!(error.user_message(), "Email already taken");
        assert_eq!(error.status_code(), Some(422));
        assert_eq!(
            error.to_string(),
            "API error (status 422): Email already taken"
        );
    }

    #[test]
    fn test_status_message_falls_back_to_reason() {
        let error = ApiError::status(404, Value::Null);
        assert_eq!(error.user_message(), "Not Found");
        assert_eq!(error.body(), None);

        let error = ApiError::status(599, json!("upstream exploded"));
        assert_eq!(error.user_message(), "HTTP 599");
        assert_eq!(error.body(), Some(&json!("upstream exploded")));
    }

    #[test]
    fn test_timeout_display() {
        let error = ApiError::Timeout(Duration::from_secs(30));
        assert!(error.is_timeout());
        assert_eq!(error.to_string(), "Request timed out after 30000ms");
        assert_eq!(error.user_message(), "Request timed out after 30000ms");
    }
}
