//! API-specific error types
//!
//! Classifies failed requests so callers can tell an expired session apart
//! from a validation error or an unreachable server.

use std::time::Duration;

use hisris_core::RefreshError;
use hisris_domain::HisRisError;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401/403 or a failed token refresh; the user must sign in again
    Authentication,
    /// 429 - retry with backoff
    RateLimit,
    /// 5xx - retryable
    Server,
    /// 4xx other than auth and rate limiting - non-retryable
    Client,
    /// Connection failures and timeouts - retryable
    Network,
    /// Bad configuration or undecodable responses - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 that could not be recovered by a token refresh
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The session expired and the refresh endpoint did not renew it
    #[error("Session expired: {0}")]
    RefreshFailed(#[from] RefreshError),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Unauthorized(_) | Self::Forbidden(_) | Self::RefreshFailed(_) => {
                ApiErrorCategory::Authentication
            }
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } | Self::NotFound(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) | Self::Decode(_) => ApiErrorCategory::Config,
        }
    }

    /// Check if the caller may reasonably retry this request later
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }

    /// True when the user has been signed out and must log in again
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::RefreshFailed(_))
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimit(_) => Some(429),
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::RefreshFailed(RefreshError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Classify a non-success response.
    pub fn from_status(status: reqwest::StatusCode, path: &str, body: String) -> Self {
        let message = if body.is_empty() {
            format!("{path} returned status {status}")
        } else {
            format!("{path} returned status {status}: {body}")
        };

        match status.as_u16() {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            429 => Self::RateLimit(message),
            code @ 500..=599 => Self::Server { status: code, message },
            code => Self::Client { status: code, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Config(format!("invalid request: {err}"));
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self::Network(format!("connection failed: {err}"));
        }
        Self::Network(err.to_string())
    }
}

impl From<ApiError> for HisRisError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err.category() {
            ApiErrorCategory::Authentication => HisRisError::Auth(message),
            ApiErrorCategory::RateLimit
            | ApiErrorCategory::Server
            | ApiErrorCategory::Network => HisRisError::Network(message),
            ApiErrorCategory::Client if matches!(err, ApiError::NotFound(_)) => {
                HisRisError::NotFound(message)
            }
            ApiErrorCategory::Client => HisRisError::InvalidInput(message),
            ApiErrorCategory::Config => HisRisError::Config(message),
        }
    }
}
