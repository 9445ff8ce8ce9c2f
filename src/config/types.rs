//! Client configuration
//!
//! `ClientOptions` is read from `DYDX_*` environment variables or from YAML,
//! then checked by `validate()` before a client is built from it.

use std::env;
use std::fmt;

use serde::Deserialize;

use crate::error::AppError;
use crate::logging::SanitizedValue;
use crate::signing::ApiKeyCredentials;

use super::constants::{api_timeout, API_HOST_MAINNET, DEFAULT_API_TIMEOUT_MS};

fn default_host() -> String {
    API_HOST_MAINNET.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_API_TIMEOUT_MS
}

/// Options for `DydxClient::new`
#[derive(Clone, Deserialize)]
pub struct ClientOptions {
    /// REST host, e.g. `https://api.dydx.exchange`
    #[serde(default = "default_host")]
    pub host: String,
    /// Ethereum network id; resolved from the node or defaulted to mainnet when unset
    #[serde(default)]
    pub network_id: Option<u64>,
    #[serde(default = "default_timeout_ms")]
    pub api_timeout_ms: u64,
    #[serde(default)]
    pub default_ethereum_address: Option<String>,
    /// Hex secp256k1 key for local onboarding signatures
    #[serde(default)]
    pub eth_private_key: Option<String>,
    /// JSON-RPC endpoint used when no local key is set
    #[serde(default)]
    pub web3_provider_url: Option<String>,
    #[serde(default)]
    pub stark_private_key: Option<String>,
    /// STARK public key x coordinate, set together with the y coordinate
    #[serde(default)]
    pub stark_public_key: Option<String>,
    #[serde(default)]
    pub stark_public_key_y_coordinate: Option<String>,
    #[serde(default)]
    pub api_key_credentials: Option<ApiKeyCredentials>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            network_id: None,
            api_timeout_ms: DEFAULT_API_TIMEOUT_MS,
            default_ethereum_address: None,
            eth_private_key: None,
            web3_provider_url: None,
            stark_private_key: None,
            stark_public_key: None,
            stark_public_key_y_coordinate: None,
            api_key_credentials: None,
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("host", &self.host)
            .field("network_id", &self.network_id)
            .field("api_timeout_ms", &self.api_timeout_ms)
            .field("default_ethereum_address", &self.default_ethereum_address)
            .field(
                "eth_private_key",
                &self.eth_private_key.as_deref().map(SanitizedValue::new),
            )
            .field("web3_provider_url", &self.web3_provider_url)
            .field(
                "stark_private_key",
                &self.stark_private_key.as_deref().map(SanitizedValue::new),
            )
            .field("stark_public_key", &self.stark_public_key)
            .field(
                "stark_public_key_y_coordinate",
                &self.stark_public_key_y_coordinate,
            )
            .field("api_key_credentials", &self.api_key_credentials)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn is_hex_of_len(value: &str, len: usize) -> bool {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    stripped.len() == len && stripped.chars().all(|c| c.is_ascii_hexdigit())
}

/// Non-empty hex of at most 32 bytes (field elements are not zero padded)
fn is_field_hex(value: &str) -> bool {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    !stripped.is_empty() && stripped.len() <= 64 && stripped.chars().all(|c| c.is_ascii_hexdigit())
}

impl ClientOptions {
    /// Build options from `DYDX_*` environment variables
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        let host = non_empty_var("DYDX_HOST").unwrap_or_else(default_host);

        let network_id = match non_empty_var("DYDX_NETWORK_ID") {
            Some(v) => Some(v.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("DYDX_NETWORK_ID must be a number (got '{}')", v))
            })?),
            None => None,
        };

        let api_timeout_ms = api_timeout().as_millis() as u64;

        let key = non_empty_var("DYDX_API_KEY");
        let secret = non_empty_var("DYDX_API_SECRET");
        let passphrase = non_empty_var("DYDX_API_PASSPHRASE");
        let api_key_credentials = match (key, secret, passphrase) {
            (Some(key), Some(secret), Some(passphrase)) => Some(ApiKeyCredentials {
                key,
                secret,
                passphrase,
            }),
            (None, None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "DYDX_API_KEY, DYDX_API_SECRET and DYDX_API_PASSPHRASE must be set together"
                        .to_string(),
                ))
            }
        };

        let options = Self {
            host,
            network_id,
            api_timeout_ms,
            default_ethereum_address: non_empty_var("DYDX_ETHEREUM_ADDRESS"),
            eth_private_key: non_empty_var("DYDX_ETH_PRIVATE_KEY"),
            web3_provider_url: non_empty_var("DYDX_WEB3_URL"),
            stark_private_key: non_empty_var("DYDX_STARK_PRIVATE_KEY"),
            stark_public_key: non_empty_var("DYDX_STARK_PUBLIC_KEY"),
            stark_public_key_y_coordinate: non_empty_var("DYDX_STARK_PUBLIC_KEY_Y"),
            api_key_credentials,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check option values before any network or signing work
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "host must start with http:// or https:// (got '{}')",
                self.host
            )));
        }

        if self.network_id == Some(0) {
            return Err(AppError::Config("network_id must be > 0".to_string()));
        }

        if self.api_timeout_ms == 0 {
            return Err(AppError::Config("api_timeout_ms must be > 0".to_string()));
        }

        if let Some(address) = &self.default_ethereum_address {
            if !address.starts_with("0x") || !is_hex_of_len(address, 40) {
                return Err(AppError::Config(format!(
                    "default_ethereum_address is not a 0x-prefixed 20-byte address (got '{}')",
                    address
                )));
            }
        }

        if let Some(key) = &self.eth_private_key {
            if !is_hex_of_len(key, 64) {
                return Err(AppError::Config(
                    "eth_private_key must be 32 bytes of hex".to_string(),
                ));
            }
        }

        if let Some(key) = &self.stark_private_key {
            if !is_field_hex(key) {
                return Err(AppError::Config(
                    "stark_private_key must be hex of at most 32 bytes".to_string(),
                ));
            }
        }

        match (&self.stark_public_key, &self.stark_public_key_y_coordinate) {
            (Some(x), Some(y)) => {
                if !is_field_hex(x) || !is_field_hex(y) {
                    return Err(AppError::Config(
                        "stark_public_key and its y coordinate must be hex of at most 32 bytes"
                            .to_string(),
                    ));
                }
            }
            (None, None) => {}
            _ => {
                return Err(AppError::Config(
                    "stark_public_key and stark_public_key_y_coordinate must be set together"
                        .to_string(),
                ))
            }
        }

        if let Some(creds) = &self.api_key_credentials {
            if creds.key.is_empty() || creds.secret.is_empty() || creds.passphrase.is_empty() {
                return Err(AppError::Config(
                    "api_key_credentials requires key, secret and passphrase".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "DYDX_HOST",
        "DYDX_NETWORK_ID",
        "DYDX_API_TIMEOUT_MS",
        "DYDX_ETHEREUM_ADDRESS",
        "DYDX_ETH_PRIVATE_KEY",
        "DYDX_WEB3_URL",
        "DYDX_STARK_PRIVATE_KEY",
        "DYDX_STARK_PUBLIC_KEY",
        "DYDX_STARK_PUBLIC_KEY_Y",
        "DYDX_API_KEY",
        "DYDX_API_SECRET",
        "DYDX_API_PASSPHRASE",
    ];

    const STARK_PUBLIC_KEY: &str =
        "0x2c256a659da55071d90cdb27c247264b2544d4129746a07df90c97c601cbf39";
    const STARK_PUBLIC_KEY_Y: &str =
        "0x49257237c10719d38ef7a1523fa41af41e57d8ecbdc9e5294ac2f89781c533a";

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_is_valid() {
        let options = ClientOptions::default();
        assert_eq!(options.host, API_HOST_MAINNET);
        assert_eq!(options.api_timeout_ms, 3000);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_host() {
        let options = ClientOptions {
            host: "api.dydx.exchange".into(),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("host must start with"));
    }

    #[test]
    fn test_validate_rejects_zero_network() {
        let options = ClientOptions {
            network_id: Some(0),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_address() {
        let options = ClientOptions {
            default_ethereum_address: Some("0x1234".into()),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("default_ethereum_address"));
    }

    #[test]
    fn test_validate_rejects_empty_credentials() {
        let options = ClientOptions {
            api_key_credentials: Some(ApiKeyCredentials {
                key: "k".into(),
                secret: String::new(),
                passphrase: "p".into(),
            }),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_stark_public_key_pair() {
        let both = ClientOptions {
            stark_public_key: Some(STARK_PUBLIC_KEY.into()),
            stark_public_key_y_coordinate: Some(STARK_PUBLIC_KEY_Y.into()),
            ..Default::default()
        };
        assert!(both.validate().is_ok());

        let x_only = ClientOptions {
            stark_public_key: Some(STARK_PUBLIC_KEY.into()),
            ..Default::default()
        };
        let err = x_only.validate().unwrap_err();
        assert!(err.to_string().contains("set together"));

        let bad_y = ClientOptions {
            stark_public_key_y_coordinate: Some("0xzz".into()),
            ..both
        };
        assert!(bad_y.validate().is_err());
    }

    #[test]
    #[serial(env)]
    fn test_from_env_stark_public_key() {
        clear_env();
        env::set_var("DYDX_STARK_PUBLIC_KEY", STARK_PUBLIC_KEY);
        env::set_var("DYDX_STARK_PUBLIC_KEY_Y", STARK_PUBLIC_KEY_Y);
        let options = ClientOptions::from_env().unwrap();
        assert_eq!(options.stark_public_key.as_deref(), Some(STARK_PUBLIC_KEY));
        assert_eq!(
            options.stark_public_key_y_coordinate.as_deref(),
            Some(STARK_PUBLIC_KEY_Y)
        );
        clear_env();
    }

    #[test]
    fn test_debug_redacts_keys() {
        let options = ClientOptions {
            eth_private_key: Some(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".into(),
            ),
            ..Default::default()
        };
        let debug = format!("{:?}", options);
        assert!(!debug.contains("bec39a17"), "Got: {}", debug);
    }

    #[test]
    #[serial(env)]
    fn test_from_env_defaults() {
        clear_env();
        let options = ClientOptions::from_env().unwrap();
        assert_eq!(options.host, API_HOST_MAINNET);
        assert_eq!(options.network_id, None);
        assert!(options.api_key_credentials.is_none());
    }

    #[test]
    #[serial(env)]
    fn test_from_env_full() {
        clear_env();
        env::set_var("DYDX_HOST", "https://api.stage.dydx.exchange");
        env::set_var("DYDX_NETWORK_ID", "3");
        env::set_var("DYDX_API_TIMEOUT_MS", "1500");
        env::set_var("DYDX_ETHEREUM_ADDRESS", "0x93A0b678674BB2bAF5D47B12d33723070d2c8783");
        env::set_var("DYDX_API_KEY", "c46cf31b-9785-b3a5-335d-f143d921da06");
        env::set_var("DYDX_API_SECRET", "YsuPghw9TJNKlY9pkku6-M9_1Ge2JnxlfLV4_7cO");
        env::set_var("DYDX_API_PASSPHRASE", "COKBKEVWgIBjxDaeyJi0");

        let options = ClientOptions::from_env().unwrap();
        assert_eq!(options.host, "https://api.stage.dydx.exchange");
        assert_eq!(options.network_id, Some(3));
        assert_eq!(options.api_timeout_ms, 1500);
        let creds = options.api_key_credentials.unwrap();
        assert_eq!(creds.passphrase, "COKBKEVWgIBjxDaeyJi0");
        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_from_env_partial_credentials() {
        clear_env();
        env::set_var("DYDX_API_KEY", "c46cf31b-9785-b3a5-335d-f143d921da06");
        let result = ClientOptions::from_env();
        assert!(matches!(result, Err(AppError::Config(_))));
        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_from_env_bad_network_id() {
        clear_env();
        env::set_var("DYDX_NETWORK_ID", "mainnet");
        let err = ClientOptions::from_env().unwrap_err();
        assert!(err.to_string().contains("DYDX_NETWORK_ID"));
        clear_env();
    }
}
