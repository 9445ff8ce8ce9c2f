//! Credential derivation and request signing
//!
//! This module is organized into submodules:
//! - `hash` - solidity-packed Keccak-256
//! - `typed_signature` - raw signature normalization
//! - `wallet` - wallet signer trait and its local / JSON-RPC backends
//! - `eip712` - onboarding action typed data and digest
//! - `onboarding` - API credential and STARK key derivation
//! - `request` - HMAC signing of REST requests

pub mod eip712;
pub mod errors;
pub mod hash;
pub mod onboarding;
pub mod request;
pub mod typed_signature;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_utils;

pub use eip712::{Eip712Envelope, NetworkSchema, SignOnboardingAction};
pub use errors::{SigningError, SigningResult};
pub use hash::{hash_string, solidity_keccak256, solidity_keccak256_tagged, PackedValue};
pub use onboarding::{
    api_credentials_from_signature, stark_key_from_signature, ApiKeyCredentials, Onboarding,
    StarkPrivateKey, StarkPublicKey,
};
pub use request::{expire_after, generate_now_iso, sign_request, RequestDescriptor};
pub use typed_signature::{create_typed_signature, SignatureType};
pub use wallet::{LocalKeySigner, Web3Signer, WalletSigner};
