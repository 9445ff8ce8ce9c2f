//! Signing error types
//!
//! Malformed cryptographic inputs fail fast with a format error. Failures of
//! the wallet backend are kept in their own variant so callers can tell a
//! transient RPC problem apart from an integration bug.

use thiserror::Error;

/// Errors produced by hashing, signature normalization and key derivation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// Raw signature is not `0x` + 130 hex characters
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// Trailing `v` byte is not one of 00, 01, 1b, 1c
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(String),

    /// Wallet signer call failed or returned malformed data
    #[error("Wallet signer failure: {0}")]
    WalletSignerFailure(String),

    /// Base64 / hex / ABI value decoding failed
    #[error("Encoding failure: {0}")]
    EncodingFailure(String),
}

impl SigningError {
    /// Whether the caller may retry the operation.
    ///
    /// Only wallet backend failures are worth retrying; format errors will
    /// fail again with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SigningError::WalletSignerFailure(_))
    }
}

/// Result type alias for signing operations
pub type SigningResult<T> = std::result::Result<T, SigningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_signature_format_display() {
        let err = SigningError::InvalidSignatureFormat("0x1234".to_string());
        assert_eq!(err.to_string(), "Invalid signature format: 0x1234");
    }

    #[test]
    fn test_invalid_recovery_id_display() {
        let err = SigningError::InvalidRecoveryId("05".to_string());
        assert_eq!(err.to_string(), "Invalid recovery id: 05");
    }

    #[test]
    fn test_only_wallet_failures_are_retryable() {
        assert!(SigningError::WalletSignerFailure("rpc timeout".into()).is_retryable());
        assert!(!SigningError::InvalidRecoveryId("05".into()).is_retryable());
        assert!(!SigningError::InvalidSignatureFormat("short".into()).is_retryable());
        assert!(!SigningError::EncodingFailure("bad base64".into()).is_retryable());
    }
}
