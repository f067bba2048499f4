//! Error types for the market movers client

use thiserror::Error;

/// Client-wide error type
#[derive(Error, Debug)]
pub enum MoversError {
    /// The upstream provider refused the request because of rate limiting,
    /// signaled either by HTTP 429 or by an in-body quota notice.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// No snapshot of any age exists to fall back on.
    #[error("No data: {0}")]
    NoData(String),
}

impl MoversError {
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        MoversError::RateLimited(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        MoversError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        MoversError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        MoversError::Parse(msg.into())
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        MoversError::NoData(msg.into())
    }

    /// Whether this failure is a rate limit rather than a transport problem.
    /// The orchestrator's degraded-mode flagging depends on this split.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MoversError::RateLimited(_))
    }
}

/// Result type alias for movers operations
pub type MoversResult<T> = Result<T, MoversError>;
