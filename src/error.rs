//! Error types for the request chain
//!
//! Every terminal failure a caller can observe is a [`ChainError`]. The
//! persisted-query-not-found condition is deliberately absent: it is resolved
//! inside the chain by a retry and never reaches the caller.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Response reached the persisted query stage without a parsed GraphQL result")]
    NoParsedResponse,

    #[error("Interceptor {interceptor} ran before any HTTP response was produced")]
    NoHttpResponse { interceptor: &'static str },

    #[error("Malformed GraphQL response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Server responded with status {status}: {body}")]
    InvalidStatus { status: u16, body: String },

    #[error("Failed to parse response body as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request was retried {retries} times without completing")]
    RetryLimitExceeded { retries: u32 },

    #[error("Interceptor {interceptor} panicked: {message}")]
    InterceptorPanicked {
        interceptor: &'static str,
        message: String,
    },

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Request chain has no interceptors")]
    NoInterceptors,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ChainResult<T> = Result<T, ChainError>;

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        ChainError::Transport {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}
