//! Ethereum wallet signers
//!
//! The onboarding flow only needs one capability from a wallet: sign an
//! EIP-712 digest and hand back the raw 65-byte signature. Two backends are
//! provided:
//! - [`LocalKeySigner`] signs in-process with a secp256k1 private key
//! - [`Web3Signer`] forwards the typed data to a node via `eth_signTypedData`

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use ethers::core::types::{Address, H256};
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;

use super::eip712::Eip712Envelope;
use super::errors::{SigningError, SigningResult};

/// Wallet capability used by the onboarding signer
///
/// Implementations return the raw signature as `0x` + 130 hex characters
/// (r‖s‖v). Normalization of `v` happens in the caller.
#[async_trait]
pub trait WalletSigner: Send + Sync + fmt::Debug {
    async fn sign_typed_data(
        &self,
        envelope: &Eip712Envelope,
        message_hash: [u8; 32],
        address: &str,
    ) -> SigningResult<String>;
}

// =============================================================================
// Local Key Signer
// =============================================================================

/// Signs digests with an in-memory private key (deterministic, no I/O)
#[derive(Clone)]
pub struct LocalKeySigner {
    wallet: LocalWallet,
}

impl LocalKeySigner {
    /// Build from a hex private key (with or without `0x`)
    pub fn from_private_key(private_key: &str) -> SigningResult<Self> {
        let wallet: LocalWallet = private_key
            .parse()
            .map_err(|e| SigningError::EncodingFailure(format!("Invalid private key: {}", e)))?;
        Ok(Self { wallet })
    }

    /// Checksummed address of the key
    pub fn address(&self) -> String {
        to_checksum(&self.wallet.address(), None)
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.address())
            .finish()
    }
}

#[async_trait]
impl WalletSigner for LocalKeySigner {
    async fn sign_typed_data(
        &self,
        _envelope: &Eip712Envelope,
        message_hash: [u8; 32],
        address: &str,
    ) -> SigningResult<String> {
        let requested = Address::from_str(address).map_err(|e| {
            SigningError::WalletSignerFailure(format!("Invalid signer address {}: {}", address, e))
        })?;
        if requested != self.wallet.address() {
            return Err(SigningError::WalletSignerFailure(format!(
                "Local key controls {}, not {}",
                self.address(),
                address
            )));
        }

        let signature = self
            .wallet
            .sign_hash(H256::from(message_hash))
            .map_err(|e| SigningError::WalletSignerFailure(format!("Signing failed: {}", e)))?;

        let sig_bytes = signature.to_vec();
        if sig_bytes.len() != 65 {
            return Err(SigningError::WalletSignerFailure(format!(
                "Invalid signature length: {} (expected 65)",
                sig_bytes.len()
            )));
        }
        Ok(format!("0x{}", hex::encode(sig_bytes)))
    }
}

// =============================================================================
// Web3 (JSON-RPC) Signer
// =============================================================================

/// JSON-RPC method used to request typed-data signatures
const SIGN_TYPED_DATA_METHOD: &str = "eth_signTypedData";

/// Delegates signing to an Ethereum node or wallet over JSON-RPC
#[derive(Debug, Clone)]
pub struct Web3Signer {
    provider: Provider<Http>,
}

impl Web3Signer {
    pub fn new(rpc_url: &str) -> SigningResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            SigningError::WalletSignerFailure(format!("Invalid provider url {}: {}", rpc_url, e))
        })?;
        Ok(Self { provider })
    }

    /// Network id reported by the node (`net_version`)
    pub async fn network_id(&self) -> SigningResult<u64> {
        let version = self
            .provider
            .get_net_version()
            .await
            .map_err(|e| SigningError::WalletSignerFailure(format!("net_version failed: {}", e)))?;
        version.parse().map_err(|_| {
            SigningError::WalletSignerFailure(format!("Unexpected net_version: {}", version))
        })
    }
}

#[async_trait]
impl WalletSigner for Web3Signer {
    #[tracing::instrument(skip(self, envelope))]
    async fn sign_typed_data(
        &self,
        envelope: &Eip712Envelope,
        _message_hash: [u8; 32],
        address: &str,
    ) -> SigningResult<String> {
        let signature: String = self
            .provider
            .request(SIGN_TYPED_DATA_METHOD, (address, envelope))
            .await
            .map_err(|e| {
                tracing::warn!(phase = "onboarding", error = %e, "Remote typed-data signing failed");
                SigningError::WalletSignerFailure(format!("{} failed: {}", SIGN_TYPED_DATA_METHOD, e))
            })?;
        Ok(signature)
    }
}
