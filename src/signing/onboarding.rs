//! API credential and STARK key derivation
//!
//! Both derivations are pure functions of a wallet signature over a fixed
//! action, so the same wallet on the same network always recovers the same
//! keys.
//!
//! - "dYdX Onboarding": `r` → secret, `s` → key + passphrase
//! - "dYdX STARK Key": whole signature → STARK private key

use std::fmt;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Serialize};
use starknet_crypto::FieldElement;
use uuid::Uuid;

use crate::config::constants::{OFF_CHAIN_KEY_DERIVATION_ACTION, OFF_CHAIN_ONBOARDING_ACTION};
use crate::logging::SanitizedValue;

use super::eip712::SignOnboardingAction;
use super::errors::{SigningError, SigningResult};
use super::hash::{solidity_keccak256, PackedValue};
use super::typed_signature::RAW_SIGNATURE_HEX_LEN;

/// Bits dropped from the hashed signature so the key fits the STARK field
const STARK_KEY_SHIFT_BITS: u32 = 5;

// =============================================================================
// Credentials
// =============================================================================

/// Exchange API key triple used for HMAC request authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyCredentials {
    /// UUID-formatted key
    pub key: String,
    /// URL-safe base64 HMAC secret
    pub secret: String,
    /// URL-safe base64 passphrase
    pub passphrase: String,
}

impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("key", &self.key)
            .field("secret", &SanitizedValue::new(&self.secret).to_string())
            .field("passphrase", &SanitizedValue::new(&self.passphrase).to_string())
            .finish()
    }
}

/// STARK private key used by the order signer
#[derive(Clone, PartialEq, Eq)]
pub struct StarkPrivateKey(BigUint);

impl StarkPrivateKey {
    /// Parse a `0x`-prefixed (or bare) hex key
    pub fn from_hex(value: &str) -> SigningResult<Self> {
        let digits = value.strip_prefix("0x").unwrap_or(value);
        BigUint::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| SigningError::EncodingFailure(format!("Invalid STARK key: {}", e)))
    }

    /// `0x` + lowercase hex, no zero padding
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// STARK public key (x coordinate) for this private key
    pub fn public_key(&self) -> SigningResult<String> {
        let private_key = FieldElement::from_hex_be(&self.to_hex())
            .map_err(|e| SigningError::EncodingFailure(format!("STARK key out of field: {}", e)))?;
        let public_key = starknet_crypto::get_public_key(&private_key);
        Ok(format!("0x{:x}", public_key))
    }
}

/// STARK public key as both curve coordinates, as registered when onboarding
/// a new account. Only the x coordinate can be derived here, so the pair is
/// supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarkPublicKey {
    pub x: String,
    pub y: String,
}

impl StarkPublicKey {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Whether `x` is the public key of `private_key`, ignoring case and zero padding
    pub fn belongs_to(&self, private_key: &StarkPrivateKey) -> SigningResult<bool> {
        let expected = StarkPrivateKey::from_hex(&private_key.public_key()?)?;
        let actual = StarkPrivateKey::from_hex(&self.x)?;
        Ok(expected.as_biguint() == actual.as_biguint())
    }
}

impl fmt::Display for StarkPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for StarkPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StarkPrivateKey(***)")
    }
}

// =============================================================================
// Pure Derivations
// =============================================================================

fn signature_digits(signature: &str) -> SigningResult<&str> {
    let digits = signature.strip_prefix("0x").unwrap_or(signature);
    if digits.len() < RAW_SIGNATURE_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SigningError::InvalidSignatureFormat(format!(
            "Expected at least {} hex characters, got {}",
            RAW_SIGNATURE_HEX_LEN,
            signature.len()
        )));
    }
    Ok(digits)
}

fn hash_uint256(value: BigUint) -> [u8; 32] {
    solidity_keccak256(&[PackedValue::Uint256(value)])
}

fn parse_hex_uint(digits: &str) -> SigningResult<BigUint> {
    BigUint::from_str_radix(digits, 16)
        .map_err(|e| SigningError::InvalidSignatureFormat(format!("Invalid hex integer: {}", e)))
}

/// Derive API credentials from an onboarding typed signature
pub fn api_credentials_from_signature(signature: &str) -> SigningResult<ApiKeyCredentials> {
    let digits = signature_digits(signature)?;
    let r = parse_hex_uint(&digits[..64])?;
    let s = parse_hex_uint(&digits[64..128])?;

    let hashed_r = hash_uint256(r);
    let secret_bytes = &hashed_r[..30];

    let hashed_s = hash_uint256(s);
    let mut key_bytes = [0u8; 16];
    key_bytes.copy_from_slice(&hashed_s[..16]);
    let passphrase_bytes = &hashed_s[16..31];

    Ok(ApiKeyCredentials {
        key: Uuid::from_bytes(key_bytes).hyphenated().to_string(),
        secret: URL_SAFE.encode(secret_bytes),
        passphrase: URL_SAFE.encode(passphrase_bytes),
    })
}

/// Derive the STARK private key from a key-derivation typed signature
pub fn stark_key_from_signature(signature: &str) -> SigningResult<StarkPrivateKey> {
    let digits = signature_digits(signature)?;
    let signature_int = parse_hex_uint(digits)?;

    let hashed = BigUint::from_bytes_be(&hash_uint256(signature_int));
    Ok(StarkPrivateKey(hashed >> STARK_KEY_SHIFT_BITS))
}

// =============================================================================
// Onboarding
// =============================================================================

/// Recovers API credentials and the STARK key by signing the fixed actions
#[derive(Debug, Clone)]
pub struct Onboarding {
    signer: SignOnboardingAction,
}

impl Onboarding {
    pub fn new(signer: SignOnboardingAction) -> Self {
        Self { signer }
    }

    pub fn signer(&self) -> &SignOnboardingAction {
        &self.signer
    }

    /// Sign "dYdX Onboarding" and derive the default API key triple
    #[tracing::instrument(skip(self), fields(network_id = self.signer.network_id()))]
    pub async fn recover_default_api_credentials(
        &self,
        ethereum_address: &str,
    ) -> SigningResult<ApiKeyCredentials> {
        let signature = self.signer.sign(ethereum_address, OFF_CHAIN_ONBOARDING_ACTION).await?;
        let credentials = api_credentials_from_signature(&signature)?;
        tracing::info!(
            phase = "onboarding",
            api_key = %credentials.key,
            "API credentials recovered"
        );
        Ok(credentials)
    }

    /// Sign "dYdX STARK Key" and derive the STARK private key
    #[tracing::instrument(skip(self), fields(network_id = self.signer.network_id()))]
    pub async fn derive_stark_key(&self, ethereum_address: &str) -> SigningResult<StarkPrivateKey> {
        let signature = self
            .signer
            .sign(ethereum_address, OFF_CHAIN_KEY_DERIVATION_ACTION)
            .await?;
        let key = stark_key_from_signature(&signature)?;
        tracing::info!(phase = "onboarding", "STARK private key derived");
        Ok(key)
    }
}
