//! Request outcome
//!
//! The pipeline never fails from the caller's point of view: every call
//! resolves to an [`Outcome`], and only its variant (and the emitted signals)
//! tell success from failure.

use crate::error::ApiError;
use serde_json::Value;

/// Successful HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code (2xx)
    pub status: u16,
    /// Decoded JSON body (`Null` when empty)
    pub body: Value,
}

impl ApiResponse {
    /// Response with status 200
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Result of one pipeline call
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome {
    /// The API answered with a success status
    Success(ApiResponse),
    /// The call failed; the error has already been reported through signals
    Failure(ApiError),
}

impl Outcome {
    /// Whether the call succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether the call failed
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Response, on success
    #[must_use]
    pub const fn response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Success(response) => Some(response),
            Self::Failure(_) => None,
        }
    }

    /// Error, on failure
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Convert into a plain `Result` for callers that want `?`
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] on failure.
    pub fn into_result(self) -> Result<ApiResponse, ApiError> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Failure(error) => Err(error),
        }
    }
}

impl From<Result<ApiResponse, ApiError>> for Outcome {
    fn from(result: Result<ApiResponse, ApiError>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(error) => Self::Failure(error),
        }
    }
}
