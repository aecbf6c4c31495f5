//! Retrieval gateway error types.

use ds_protocol::ErrorCode;
use thiserror::Error;

/// Errors surfaced by the retrieval gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Transport-level failure: unreachable host, timeout, HTTP >= 400.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote tool itself reported a failure (isError flag set).
    #[error("remote tool error: {0}")]
    Remote(String),

    /// Malformed or missing payload data, or an unusable argument.
    #[error("data error: {0}")]
    Data(String),

    /// The requested dashboard does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl GatewayError {
    /// Outcome taxonomy tag for this failure.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            GatewayError::Connection(_) => ErrorCode::ConnectionError,
            GatewayError::Remote(_) | GatewayError::Data(_) => ErrorCode::DataError,
            GatewayError::NotFound(_) => ErrorCode::NotFound,
        }
    }
}

/// Convenience alias for gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;
