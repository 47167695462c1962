//! Error types for the microCMS client.
//!
//! # Design
//! Each stage of a fetch fails with its own variant so callers can tell
//! "service unreachable" apart from "service returned invalid JSON".
//! `NotFound` gets a dedicated variant because a missing content id is the
//! most common non-2xx answer. Every other non-2xx response lands in `Http`
//! with the status code and the service's error message.

use thiserror::Error;

/// Errors returned by `MicroCmsClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is unusable (empty domain or key, bad env var).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request could not be built; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, DNS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service returned 404.
    #[error("content not found")]
    NotFound,

    /// The service returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body is not valid JSON for the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ApiError::NotFound.is_client_error());
        let err = ApiError::Http {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
        assert_eq!(ApiError::Transport("refused".to_string()).status(), None);
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = ApiError::Http {
            status: 401,
            message: "X-API-KEY header is invalid.".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: X-API-KEY header is invalid.");
    }
}
