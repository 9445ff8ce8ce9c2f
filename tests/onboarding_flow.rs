//! Onboarding with a local key: typed signatures, credential recovery and
//! STARK key derivation end to end.

use std::sync::Arc;

use ethers::types::{Signature, H256};
use ethers::utils::to_checksum;

use dydx_v3::config::constants::{
    NETWORK_ID_MAINNET, NETWORK_ID_ROPSTEN, OFF_CHAIN_KEY_DERIVATION_ACTION,
    OFF_CHAIN_ONBOARDING_ACTION,
};
use dydx_v3::signing::{
    api_credentials_from_signature, LocalKeySigner, Onboarding, SignOnboardingAction,
    SigningError, WalletSigner,
};

const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const HARDHAT_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn action_signer(network_id: u64) -> SignOnboardingAction {
    let signer: Arc<dyn WalletSigner> =
        Arc::new(LocalKeySigner::from_private_key(HARDHAT_KEY).unwrap());
    SignOnboardingAction::new(signer, network_id)
}

fn is_uuid_shape(key: &str) -> bool {
    key.len() == 36
        && key.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit() && !c.is_ascii_uppercase(),
        })
}

#[tokio::test]
async fn test_typed_signature_recovers_to_signer() {
    for network_id in [NETWORK_ID_MAINNET, NETWORK_ID_ROPSTEN] {
        let action = action_signer(network_id);
        let typed = action
            .sign(HARDHAT_ADDRESS, OFF_CHAIN_ONBOARDING_ACTION)
            .await
            .unwrap();

        assert_eq!(typed.len(), 2 + 130 + 2);
        assert!(typed.ends_with("1b00") || typed.ends_with("1c00"), "Got: {}", typed);

        let raw = hex::decode(&typed[2..132]).unwrap();
        let signature = Signature::try_from(raw.as_slice()).unwrap();
        let digest = action.message_hash(OFF_CHAIN_ONBOARDING_ACTION);
        let recovered = signature.recover(H256::from(digest)).unwrap();
        assert_eq!(to_checksum(&recovered, None), HARDHAT_ADDRESS);
    }
}

#[tokio::test]
async fn test_recover_credentials_is_idempotent() {
    let onboarding = Onboarding::new(action_signer(NETWORK_ID_MAINNET));

    let first = onboarding
        .recover_default_api_credentials(HARDHAT_ADDRESS)
        .await
        .unwrap();
    let second = onboarding
        .recover_default_api_credentials(HARDHAT_ADDRESS)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(is_uuid_shape(&first.key), "Got: {}", first.key);
    assert_eq!(first.secret.len(), 40);
    assert_eq!(first.passphrase.len(), 20);
}

#[tokio::test]
async fn test_credentials_match_pure_derivation() {
    let action = action_signer(NETWORK_ID_ROPSTEN);
    let typed = action
        .sign(HARDHAT_ADDRESS, OFF_CHAIN_ONBOARDING_ACTION)
        .await
        .unwrap();
    let expected = api_credentials_from_signature(&typed).unwrap();

    let recovered = Onboarding::new(action)
        .recover_default_api_credentials(HARDHAT_ADDRESS)
        .await
        .unwrap();
    assert_eq!(recovered, expected);
}

#[tokio::test]
async fn test_networks_yield_different_credentials() {
    let mainnet = Onboarding::new(action_signer(NETWORK_ID_MAINNET))
        .recover_default_api_credentials(HARDHAT_ADDRESS)
        .await
        .unwrap();
    let ropsten = Onboarding::new(action_signer(NETWORK_ID_ROPSTEN))
        .recover_default_api_credentials(HARDHAT_ADDRESS)
        .await
        .unwrap();
    assert_ne!(mainnet.key, ropsten.key);
    assert_ne!(mainnet.secret, ropsten.secret);
}

#[tokio::test]
async fn test_stark_key_is_idempotent_and_in_field() {
    let onboarding = Onboarding::new(action_signer(NETWORK_ID_ROPSTEN));
    let first = onboarding.derive_stark_key(HARDHAT_ADDRESS).await.unwrap();
    let second = onboarding.derive_stark_key(HARDHAT_ADDRESS).await.unwrap();

    assert_eq!(first, second);
    assert!(first.as_biguint().bits() <= 251);
    assert!(first.to_hex().starts_with("0x"));
    assert!(first.public_key().unwrap().starts_with("0x"));
}

#[tokio::test]
async fn test_stark_and_onboarding_actions_differ() {
    let action = action_signer(NETWORK_ID_MAINNET);
    assert_ne!(
        action.message_hash(OFF_CHAIN_ONBOARDING_ACTION),
        action.message_hash(OFF_CHAIN_KEY_DERIVATION_ACTION)
    );
}

#[tokio::test]
async fn test_envelope_schema_per_network() {
    let mainnet = serde_json::to_value(
        action_signer(NETWORK_ID_MAINNET).eip712_message(OFF_CHAIN_ONBOARDING_ACTION),
    )
    .unwrap();
    assert_eq!(mainnet["primaryType"], "dYdX");
    assert_eq!(mainnet["domain"]["chainId"], 1);
    assert_eq!(mainnet["message"]["onlySignOn"], "https://trade.dydx.exchange");
    assert_eq!(mainnet["types"]["dYdX"].as_array().unwrap().len(), 2);

    let ropsten = serde_json::to_value(
        action_signer(NETWORK_ID_ROPSTEN).eip712_message(OFF_CHAIN_ONBOARDING_ACTION),
    )
    .unwrap();
    assert_eq!(ropsten["domain"]["chainId"], 3);
    assert!(ropsten["message"].get("onlySignOn").is_none());
    assert_eq!(ropsten["types"]["dYdX"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_address_fails() {
    let onboarding = Onboarding::new(action_signer(NETWORK_ID_MAINNET));
    let result = onboarding
        .recover_default_api_credentials("0x93A0b678674BB2bAF5D47B12d33723070d2c8783")
        .await;
    assert!(matches!(result, Err(SigningError::WalletSignerFailure(_))));
}
