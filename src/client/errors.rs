//! REST client error types
//!
//! Transport, HTTP and decoding failures of the private API are wrapped in
//! `ExchangeError`. Signing failures convert via `#[from]`.

use thiserror::Error;

use crate::signing::SigningError;

/// Errors raised by `PrivateClient` and `DydxClient`
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Connection to the API host failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Body could not be read or decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Non-2xx status from the API
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Missing or unusable credentials / keys
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
}

impl ExchangeError {
    /// Map a `reqwest` transport error, keeping timeouts distinct
    pub(crate) fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ExchangeError::NetworkTimeout(timeout_ms)
        } else {
            ExchangeError::ConnectionFailed(err.to_string())
        }
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
