//! Client facade
//!
//! `DydxClient::new` resolves the wallet signer, the network id and the API
//! credentials from `ClientOptions`, then wires up onboarding and the private
//! REST client.

use std::sync::Arc;

use crate::config::constants::NETWORK_ID_MAINNET;
use crate::config::ClientOptions;
use crate::error::AppError;
use crate::signing::{
    LocalKeySigner, Onboarding, SignOnboardingAction, StarkPrivateKey, StarkPublicKey,
    WalletSigner, Web3Signer,
};

use super::order_signer::StarkOrderSigner;
use super::private::PrivateClient;

/// Entry point bundling onboarding and the private API
#[derive(Debug, Clone)]
pub struct DydxClient {
    host: String,
    network_id: u64,
    default_ethereum_address: Option<String>,
    stark_public_key: Option<StarkPublicKey>,
    onboarding: Option<Onboarding>,
    private: PrivateClient,
}

impl DydxClient {
    /// Build a client, recovering API credentials through the wallet signer
    /// when none are supplied
    #[tracing::instrument(skip(options), fields(host = %options.host))]
    pub async fn new(options: ClientOptions) -> Result<Self, AppError> {
        options.validate()?;
        let host = options.host.trim_end_matches('/').to_string();

        let (signer, node_network_id) = Self::build_signer(&options).await?;
        let network_id = options
            .network_id
            .or(node_network_id)
            .unwrap_or(NETWORK_ID_MAINNET);

        let onboarding = signer
            .map(|signer| Onboarding::new(SignOnboardingAction::new(signer, network_id)));

        let credentials = match (&options.api_key_credentials, &onboarding) {
            (Some(credentials), _) => credentials.clone(),
            (None, Some(onboarding)) => {
                let address = options.default_ethereum_address.as_deref().ok_or_else(|| {
                    AppError::Config(
                        "default_ethereum_address is required to recover API credentials"
                            .to_string(),
                    )
                })?;
                onboarding.recover_default_api_credentials(address).await?
            }
            (None, None) => {
                return Err(AppError::Config(
                    "No API credentials and no wallet signer (eth_private_key or web3_provider_url) configured"
                        .to_string(),
                ))
            }
        };

        let mut private =
            PrivateClient::new(host.clone(), network_id, credentials, options.api_timeout_ms);
        if let Some(address) = &options.default_ethereum_address {
            private = private.with_default_address(address.clone());
        }
        let stark_private_key = options
            .stark_private_key
            .as_deref()
            .map(StarkPrivateKey::from_hex)
            .transpose()?;

        let stark_public_key = match (
            options.stark_public_key,
            options.stark_public_key_y_coordinate,
        ) {
            (Some(x), Some(y)) => Some(StarkPublicKey::new(x, y)),
            _ => None,
        };
        if let (Some(public_key), Some(private_key)) = (&stark_public_key, &stark_private_key) {
            if !public_key.belongs_to(private_key)? {
                return Err(AppError::Config(
                    "stark_public_key does not match stark_private_key".to_string(),
                ));
            }
        }
        if let Some(key) = stark_private_key {
            private = private.with_stark_private_key(key);
        }

        tracing::info!(
            phase = "init",
            exchange = "dydx",
            host = %host,
            network_id,
            has_signer = onboarding.is_some(),
            has_stark_key = options.stark_private_key.is_some(),
            "dYdX client ready"
        );

        Ok(Self {
            host,
            network_id,
            default_ethereum_address: options.default_ethereum_address,
            stark_public_key,
            onboarding,
            private,
        })
    }

    /// Local key wins over a JSON-RPC provider; only the provider reports a network id
    async fn build_signer(
        options: &ClientOptions,
    ) -> Result<(Option<Arc<dyn WalletSigner>>, Option<u64>), AppError> {
        if let Some(key) = &options.eth_private_key {
            let signer = LocalKeySigner::from_private_key(key)?;
            tracing::debug!(phase = "init", address = %signer.address(), "Using local key signer");
            let signer: Arc<dyn WalletSigner> = Arc::new(signer);
            return Ok((Some(signer), None));
        }

        if let Some(url) = &options.web3_provider_url {
            let signer = Web3Signer::new(url)?;
            let node_network_id = if options.network_id.is_none() {
                match signer.network_id().await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        tracing::warn!(
                            phase = "init",
                            error = %e,
                            "Could not read net_version, defaulting network id"
                        );
                        None
                    }
                }
            } else {
                None
            };
            let signer: Arc<dyn WalletSigner> = Arc::new(signer);
            return Ok((Some(signer), node_network_id));
        }

        Ok((None, None))
    }

    /// Attach the STARK order signer used by `create_order`
    pub fn with_order_signer(mut self, signer: Arc<dyn StarkOrderSigner>) -> Self {
        self.private = self.private.with_order_signer(signer);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub fn default_ethereum_address(&self) -> Option<&str> {
        self.default_ethereum_address.as_deref()
    }

    /// Configured STARK public key (x and y coordinates)
    pub fn stark_public_key(&self) -> Option<&StarkPublicKey> {
        self.stark_public_key.as_ref()
    }

    /// `None` when the client was built from API credentials alone
    pub fn onboarding(&self) -> Option<&Onboarding> {
        self.onboarding.as_ref()
    }

    pub fn private(&self) -> &PrivateClient {
        &self.private
    }
}
