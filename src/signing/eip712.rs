//! EIP-712 onboarding action signing
//!
//! Builds the `dYdX` typed-data message for an off-chain action, computes its
//! EIP-712 digest and asks the wallet signer for a signature over it.
//!
//! Hash construction:
//! - domain: `H(H(EIP712Domain type), H(name), H(version), chainId)`
//! - struct: `H(H(struct type), H(action)[, H(onlySignOn)])`
//! - digest: `H(0x1901 ‖ domain ‖ struct)`

use std::collections::BTreeMap;
use std::sync::Arc;

use num_bigint::BigUint;
use serde::Serialize;

use crate::config::constants::{
    EIP191_HEADER, EIP712_DOMAIN_NAME, EIP712_DOMAIN_STRING_NO_CONTRACT, EIP712_DOMAIN_VERSION,
    EIP712_ONBOARDING_ACTION_STRUCT_STRING, EIP712_ONBOARDING_ACTION_STRUCT_STRING_TESTNET,
    EIP712_STRUCT_NAME, NETWORK_ID_MAINNET, ONLY_SIGN_ON_DOMAIN_MAINNET,
};
use crate::logging::sanitize_signature;

use super::errors::SigningResult;
use super::hash::{hash_string, solidity_keccak256, to_hex_hash, PackedValue};
use super::typed_signature::{create_typed_signature, SignatureType};
use super::wallet::WalletSigner;

// =============================================================================
// Typed-Data Envelope
// =============================================================================

/// One `{name, type}` entry of an EIP-712 struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eip712Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: &'static str,
}

impl Eip712Field {
    const fn new(name: &'static str, field_type: &'static str) -> Self {
        Self { name, field_type }
    }
}

/// EIP-712 domain (no verifying contract)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
}

/// Full typed-data payload handed to the wallet (`eth_signTypedData` shape)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Envelope {
    pub types: BTreeMap<&'static str, Vec<Eip712Field>>,
    pub domain: Eip712Domain,
    pub primary_type: &'static str,
    pub message: BTreeMap<String, String>,
}

const EIP712_DOMAIN_FIELDS: [Eip712Field; 3] = [
    Eip712Field::new("name", "string"),
    Eip712Field::new("version", "string"),
    Eip712Field::new("chainId", "uint256"),
];

const ONBOARDING_ACTION_FIELDS: [Eip712Field; 2] = [
    Eip712Field::new("action", "string"),
    Eip712Field::new("onlySignOn", "string"),
];

const ONBOARDING_ACTION_FIELDS_TESTNET: [Eip712Field; 1] = [Eip712Field::new("action", "string")];

// =============================================================================
// Network Schema
// =============================================================================

/// Field set of the `dYdX` struct, keyed by network id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSchema {
    /// `{action, onlySignOn}` with `onlySignOn` pinned to the trading site
    Mainnet,
    /// `{action}` only
    Reduced,
}

impl NetworkSchema {
    pub fn for_network(network_id: u64) -> Self {
        if network_id == NETWORK_ID_MAINNET {
            NetworkSchema::Mainnet
        } else {
            NetworkSchema::Reduced
        }
    }

    pub fn fields(&self) -> &'static [Eip712Field] {
        match self {
            NetworkSchema::Mainnet => &ONBOARDING_ACTION_FIELDS,
            NetworkSchema::Reduced => &ONBOARDING_ACTION_FIELDS_TESTNET,
        }
    }

    pub fn struct_type_string(&self) -> &'static str {
        match self {
            NetworkSchema::Mainnet => EIP712_ONBOARDING_ACTION_STRUCT_STRING,
            NetworkSchema::Reduced => EIP712_ONBOARDING_ACTION_STRUCT_STRING_TESTNET,
        }
    }

    pub fn only_sign_on(&self) -> Option<&'static str> {
        match self {
            NetworkSchema::Mainnet => Some(ONLY_SIGN_ON_DOMAIN_MAINNET),
            NetworkSchema::Reduced => None,
        }
    }
}

// =============================================================================
// Onboarding Action Signer
// =============================================================================

/// Signs off-chain `dYdX` actions with an Ethereum wallet
#[derive(Debug, Clone)]
pub struct SignOnboardingAction {
    signer: Arc<dyn WalletSigner>,
    network_id: u64,
}

impl SignOnboardingAction {
    pub fn new(signer: Arc<dyn WalletSigner>, network_id: u64) -> Self {
        Self { signer, network_id }
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub fn schema(&self) -> NetworkSchema {
        NetworkSchema::for_network(self.network_id)
    }

    /// Sign `action` and return the typed signature (`NoPrepend` scheme)
    #[tracing::instrument(skip(self), fields(network_id = self.network_id))]
    pub async fn sign(&self, signer_address: &str, action: &str) -> SigningResult<String> {
        let envelope = self.eip712_message(action);
        let message_hash = self.message_hash(action);

        tracing::debug!(
            phase = "onboarding",
            message_hash = %to_hex_hash(&message_hash),
            "EIP-712 digest computed"
        );

        let raw_signature = self
            .signer
            .sign_typed_data(&envelope, message_hash, signer_address)
            .await?;
        let typed = create_typed_signature(&raw_signature, SignatureType::NoPrepend)?;

        tracing::debug!(
            phase = "onboarding",
            signature = %sanitize_signature(&typed),
            "Action signed"
        );
        Ok(typed)
    }

    /// Typed-data envelope for `action`, as shown to the wallet
    pub fn eip712_message(&self, action: &str) -> Eip712Envelope {
        let schema = self.schema();

        let mut types = BTreeMap::new();
        types.insert("EIP712Domain", EIP712_DOMAIN_FIELDS.to_vec());
        types.insert(EIP712_STRUCT_NAME, schema.fields().to_vec());

        let mut message = BTreeMap::new();
        message.insert("action".to_string(), action.to_string());
        if let Some(site) = schema.only_sign_on() {
            message.insert("onlySignOn".to_string(), site.to_string());
        }

        Eip712Envelope {
            types,
            domain: Eip712Domain {
                name: EIP712_DOMAIN_NAME,
                version: EIP712_DOMAIN_VERSION,
                chain_id: self.network_id,
            },
            primary_type: EIP712_STRUCT_NAME,
            message,
        }
    }

    pub fn domain_hash(&self) -> [u8; 32] {
        let type_hash = hash_string(EIP712_DOMAIN_STRING_NO_CONTRACT);
        let name_hash = hash_string(EIP712_DOMAIN_NAME);
        let version_hash = hash_string(EIP712_DOMAIN_VERSION);
        solidity_keccak256(&[
            PackedValue::FixedBytes(&type_hash),
            PackedValue::FixedBytes(&name_hash),
            PackedValue::FixedBytes(&version_hash),
            PackedValue::Uint256(BigUint::from(self.network_id)),
        ])
    }

    pub fn struct_hash(&self, action: &str) -> [u8; 32] {
        let schema = self.schema();
        let type_hash = hash_string(schema.struct_type_string());
        let action_hash = hash_string(action);
        let site_hash = schema.only_sign_on().map(hash_string);

        let mut values = vec![
            PackedValue::FixedBytes(&type_hash),
            PackedValue::FixedBytes(&action_hash),
        ];
        if let Some(site_hash) = site_hash.as_ref() {
            values.push(PackedValue::FixedBytes(site_hash));
        }
        solidity_keccak256(&values)
    }

    /// Final EIP-712 digest the wallet signs
    pub fn message_hash(&self, action: &str) -> [u8; 32] {
        let domain_hash = self.domain_hash();
        let struct_hash = self.struct_hash(action);
        solidity_keccak256(&[
            PackedValue::FixedBytes(&EIP191_HEADER),
            PackedValue::FixedBytes(&domain_hash),
            PackedValue::FixedBytes(&struct_hash),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::{
        NETWORK_ID_ROPSTEN, OFF_CHAIN_KEY_DERIVATION_ACTION, OFF_CHAIN_ONBOARDING_ACTION,
    };
    use crate::signing::errors::SigningError;
    use crate::signing::test_utils::{FailingSigner, FixedSigner};

    fn signer_for(network_id: u64) -> SignOnboardingAction {
        SignOnboardingAction::new(Arc::new(FixedSigner::with_v("00")), network_id)
    }

    #[test]
    fn test_schema_selection() {
        assert_eq!(NetworkSchema::for_network(1), NetworkSchema::Mainnet);
        assert_eq!(NetworkSchema::for_network(3), NetworkSchema::Reduced);
        assert_eq!(NetworkSchema::for_network(5777), NetworkSchema::Reduced);
    }

    #[test]
    fn test_mainnet_envelope_includes_only_sign_on() {
        let envelope = signer_for(NETWORK_ID_MAINNET).eip712_message(OFF_CHAIN_ONBOARDING_ACTION);
        assert_eq!(
            envelope.message.get("onlySignOn").map(String::as_str),
            Some("https://trade.dydx.exchange")
        );
        assert_eq!(envelope.types["dYdX"].len(), 2);
        assert_eq!(envelope.domain.chain_id, 1);
    }

    #[test]
    fn test_testnet_envelope_omits_only_sign_on() {
        let envelope = signer_for(NETWORK_ID_ROPSTEN).eip712_message(OFF_CHAIN_ONBOARDING_ACTION);
        assert!(!envelope.message.contains_key("onlySignOn"));
        assert_eq!(envelope.types["dYdX"], vec![Eip712Field::new("action", "string")]);
        assert_eq!(envelope.domain.chain_id, 3);
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = signer_for(NETWORK_ID_ROPSTEN).eip712_message("dYdX STARK Key");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["primaryType"], "dYdX");
        assert_eq!(json["domain"]["name"], "dYdX");
        assert_eq!(json["domain"]["version"], "1.0");
        assert_eq!(json["domain"]["chainId"], 3);
        assert_eq!(json["types"]["EIP712Domain"][2]["name"], "chainId");
        assert_eq!(json["types"]["EIP712Domain"][2]["type"], "uint256");
        assert_eq!(json["message"]["action"], "dYdX STARK Key");
    }

    #[test]
    fn test_domain_hash_vectors() {
        assert_eq!(
            hex::encode(signer_for(1).domain_hash()),
            "e3ea0d0aaace5cf68ca5fce1c4af02705c7cb412bf1e07192676f8cb886f62f3"
        );
        assert_eq!(
            hex::encode(signer_for(3).domain_hash()),
            "d9bb0aaf44767d9d5cedadfd1d7062f02b35c28aebec58af2f8fefc1fc2ac623"
        );
    }

    #[test]
    fn test_message_hash_vectors_mainnet() {
        let signer = signer_for(1);
        assert_eq!(
            hex::encode(signer.message_hash(OFF_CHAIN_ONBOARDING_ACTION)),
            "ea8542295a919314b6db804076a90473337ebec28a962ea126aea3f2bcafa679"
        );
        assert_eq!(
            hex::encode(signer.message_hash(OFF_CHAIN_KEY_DERIVATION_ACTION)),
            "0f9c71ef542bfca920d829ba80e515471e25e671202287713b8eaceef47f12dc"
        );
    }

    #[test]
    fn test_message_hash_vectors_ropsten() {
        let signer = signer_for(3);
        assert_eq!(
            hex::encode(signer.message_hash(OFF_CHAIN_ONBOARDING_ACTION)),
            "f0aee696861ada0126a0d84ad9f26ac65a9012eeeedccc4c9681d7d523b3b99e"
        );
        assert_eq!(
            hex::encode(signer.message_hash(OFF_CHAIN_KEY_DERIVATION_ACTION)),
            "4164681988aa48c9ef700f80ab418edd88d1ad8cbfda4249ee8edcc7524471b7"
        );
    }

    #[tokio::test]
    async fn test_sign_normalizes_raw_signature() {
        let signer = signer_for(NETWORK_ID_ROPSTEN);
        let typed = signer.sign("0xabc", OFF_CHAIN_ONBOARDING_ACTION).await.unwrap();
        assert!(typed.starts_with("0x"));
        assert!(typed.ends_with("1b00"));
        assert_eq!(typed.len(), 134);
    }

    #[tokio::test]
    async fn test_sign_passes_digest_to_wallet() {
        let fixed = Arc::new(FixedSigner::with_v("01"));
        let signer = SignOnboardingAction::new(fixed.clone(), NETWORK_ID_MAINNET);
        signer.sign("0xabc", OFF_CHAIN_ONBOARDING_ACTION).await.unwrap();
        assert_eq!(
            fixed.last_hash(),
            Some(signer.message_hash(OFF_CHAIN_ONBOARDING_ACTION))
        );
    }

    #[tokio::test]
    async fn test_sign_surfaces_wallet_failure() {
        let signer = SignOnboardingAction::new(Arc::new(FailingSigner), NETWORK_ID_MAINNET);
        let result = signer.sign("0xabc", OFF_CHAIN_ONBOARDING_ACTION).await;
        assert!(matches!(result, Err(SigningError::WalletSignerFailure(_))));
    }
}
