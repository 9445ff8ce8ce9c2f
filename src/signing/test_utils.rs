//! Wallet signer doubles for unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::eip712::Eip712Envelope;
use super::errors::{SigningError, SigningResult};
use super::wallet::WalletSigner;

/// Returns the same r‖s for every digest with a configurable `v` byte
#[derive(Debug)]
pub struct FixedSigner {
    raw_signature: String,
    last_hash: Mutex<Option<[u8; 32]>>,
}

impl FixedSigner {
    pub fn new(raw_signature: &str) -> Self {
        Self {
            raw_signature: raw_signature.to_string(),
            last_hash: Mutex::new(None),
        }
    }

    pub fn with_v(v: &str) -> Self {
        Self::new(&format!("0x{}{}{}", "ab".repeat(32), "cd".repeat(32), v))
    }

    pub fn last_hash(&self) -> Option<[u8; 32]> {
        *self.last_hash.lock().unwrap()
    }
}

#[async_trait]
impl WalletSigner for FixedSigner {
    async fn sign_typed_data(
        &self,
        _envelope: &Eip712Envelope,
        message_hash: [u8; 32],
        _address: &str,
    ) -> SigningResult<String> {
        *self.last_hash.lock().unwrap() = Some(message_hash);
        Ok(self.raw_signature.clone())
    }
}

/// Always fails like an unreachable node
#[derive(Debug)]
pub struct FailingSigner;

#[async_trait]
impl WalletSigner for FailingSigner {
    async fn sign_typed_data(
        &self,
        _envelope: &Eip712Envelope,
        _message_hash: [u8; 32],
        _address: &str,
    ) -> SigningResult<String> {
        Err(SigningError::WalletSignerFailure("connection refused".into()))
    }
}
