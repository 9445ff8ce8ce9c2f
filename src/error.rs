//! Application-wide error types using thiserror
//!
//! Configuration, transport and signing failures all surface as `AppError`
//! at the crate boundary.

use thiserror::Error;

use crate::client::errors::ExchangeError;
use crate::signing::SigningError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
