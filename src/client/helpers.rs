//! Request path, id and account-id helpers

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::errors::{ExchangeError, ExchangeResult};
use crate::config::constants::{order_expiration, ACCOUNT_ID_NAMESPACE};
use crate::signing::expire_after;

fn namespace() -> Uuid {
    Uuid::parse_str(ACCOUNT_ID_NAMESPACE).unwrap_or(Uuid::nil())
}

/// User id: UUIDv5 of the lowercased Ethereum address
pub fn get_user_id(address: &str) -> Uuid {
    Uuid::new_v5(&namespace(), address.to_lowercase().as_bytes())
}

/// Account id of account number 0 for an Ethereum address
pub fn get_account_id(address: &str) -> Uuid {
    let seed = format!("{}0", get_user_id(address));
    Uuid::new_v5(&namespace(), seed.as_bytes())
}

/// `endpoint` or `endpoint?query`; an empty query adds nothing
pub fn generate_query_path<T: Serialize + ?Sized>(
    endpoint: &str,
    params: &T,
) -> ExchangeResult<String> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| ExchangeError::InvalidResponse(format!("Invalid query params: {}", e)))?;
    if query.is_empty() {
        Ok(endpoint.to_string())
    } else {
        Ok(format!("{}?{}", endpoint, query))
    }
}

/// Random 16-digit decimal client id, zero-padded
pub fn random_client_id() -> String {
    let n: u64 = rand::thread_rng().gen_range(0..10_000_000_000_000_000);
    format!("{:016}", n)
}

/// Expiration for a new order, `DYDX_ORDER_EXPIRATION_SECS` from now
pub fn default_order_expiration() -> ExchangeResult<String> {
    Ok(expire_after(order_expiration())?)
}
