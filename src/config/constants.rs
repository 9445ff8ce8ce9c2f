//! Protocol constants and configuration defaults
//!
//! Protocol values are plain `const` items: they are part of the signed
//! payloads and must never change at runtime. Tunables read an environment
//! variable and fall back to a default.

use std::time::Duration;

// =============================================================================
// Hosts
// =============================================================================

pub const API_HOST_MAINNET: &str = "https://api.dydx.exchange";
pub const API_HOST_ROPSTEN: &str = "https://api.stage.dydx.exchange";

/// Every private endpoint lives under this prefix
pub const API_PATH_PREFIX: &str = "/v3/";

// =============================================================================
// Ethereum Network IDs
// =============================================================================

pub const NETWORK_ID_MAINNET: u64 = 1;
pub const NETWORK_ID_ROPSTEN: u64 = 3;

// =============================================================================
// EIP-712 Domain
// =============================================================================

pub const EIP712_DOMAIN_NAME: &str = "dYdX";
pub const EIP712_DOMAIN_VERSION: &str = "1.0";
pub const EIP712_DOMAIN_STRING_NO_CONTRACT: &str =
    "EIP712Domain(string name,string version,uint256 chainId)";
pub const EIP712_STRUCT_NAME: &str = "dYdX";
pub const EIP712_ONBOARDING_ACTION_STRUCT_STRING: &str = "dYdX(string action,string onlySignOn)";
pub const EIP712_ONBOARDING_ACTION_STRUCT_STRING_TESTNET: &str = "dYdX(string action)";

/// Site the mainnet onboarding signature is restricted to
pub const ONLY_SIGN_ON_DOMAIN_MAINNET: &str = "https://trade.dydx.exchange";

/// `\x19\x01` prefix of the final EIP-712 digest
pub const EIP191_HEADER: [u8; 2] = [0x19, 0x01];

// =============================================================================
// Off-Chain Ethereum-Signed Actions
// =============================================================================

pub const OFF_CHAIN_ONBOARDING_ACTION: &str = "dYdX Onboarding";
pub const OFF_CHAIN_KEY_DERIVATION_ACTION: &str = "dYdX STARK Key";

// =============================================================================
// Account IDs
// =============================================================================

/// UUID namespace for user and account ids
pub const ACCOUNT_ID_NAMESPACE: &str = "0f9da948-a6fb-4c45-9edc-4685c3f3317d";

// =============================================================================
// Request Authentication Headers
// =============================================================================

pub const HEADER_SIGNATURE: &str = "DYDX-SIGNATURE";
pub const HEADER_API_KEY: &str = "DYDX-API-KEY";
pub const HEADER_TIMESTAMP: &str = "DYDX-TIMESTAMP";
pub const HEADER_PASSPHRASE: &str = "DYDX-PASSPHRASE";
pub const USER_AGENT: &str = "dydx-v3-rust";

// =============================================================================
// HTTP Configuration
// =============================================================================

/// Default API timeout in milliseconds
pub const DEFAULT_API_TIMEOUT_MS: u64 = 3000;

/// HTTP request timeout (default: 3000ms)
///
/// Environment variable: `DYDX_API_TIMEOUT_MS`
pub fn api_timeout() -> Duration {
    let ms = std::env::var("DYDX_API_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_API_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Default order expiration window (default: 5 minutes)
///
/// Environment variable: `DYDX_ORDER_EXPIRATION_SECS`
pub fn order_expiration() -> Duration {
    let secs = std::env::var("DYDX_ORDER_EXPIRATION_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(300);
    Duration::from_secs(secs)
}

/// REST host for a network id (unknown networks use the staging host)
pub fn api_host_for_network(network_id: u64) -> &'static str {
    if network_id == NETWORK_ID_MAINNET {
        API_HOST_MAINNET
    } else {
        API_HOST_ROPSTEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(env)]
    fn test_default_values() {
        std::env::remove_var("DYDX_API_TIMEOUT_MS");
        std::env::remove_var("DYDX_ORDER_EXPIRATION_SECS");
        assert_eq!(api_timeout(), Duration::from_millis(3000));
        assert_eq!(order_expiration(), Duration::from_secs(300));
    }

    #[test]
    #[serial(env)]
    fn test_env_override() {
        std::env::set_var("DYDX_API_TIMEOUT_MS", "750");
        assert_eq!(api_timeout(), Duration::from_millis(750));
        std::env::remove_var("DYDX_API_TIMEOUT_MS");
    }

    #[test]
    fn test_api_host_for_network() {
        assert_eq!(api_host_for_network(NETWORK_ID_MAINNET), API_HOST_MAINNET);
        assert_eq!(api_host_for_network(NETWORK_ID_ROPSTEN), API_HOST_ROPSTEN);
    }
}
