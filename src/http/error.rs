//! Pipeline error type.

use thiserror::Error;

/// Failures the pipeline surfaces instead of a response.
///
/// Non-2xx statuses are not errors at this level; they come back as
/// [`HttpResponse`](super::HttpResponse) values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection refused, DNS failure, reset, body read failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The per-attempt deadline elapsed before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not be built; retrying will not help.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Whether the retry stage may spend another attempt on this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HttpError::Transport(_) | HttpError::Timeout(_))
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors embed the URL, which carries the access token.
        let err = err.without_url();
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidRequest(err.to_string())
        } else {
            HttpError::Transport(err.to_string())
        }
    }
}
