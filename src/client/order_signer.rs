//! STARK order signing seam
//!
//! The StarkEx order hash (asset ids, quantums, Pedersen hashing) is not part
//! of this crate. `PrivateClient::create_order` hands the order fields to a
//! caller-supplied `StarkOrderSigner` and sends back whatever it returns.

use std::fmt::Debug;

use crate::signing::{SigningResult, StarkPrivateKey};

use super::types::{ApiOrder, OrderSide};

/// Fields of an order covered by its STARK signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSignParams {
    pub network_id: u64,
    pub position_id: i64,
    pub market: String,
    pub side: OrderSide,
    /// Human-readable size, e.g. "0.01"
    pub human_size: String,
    pub human_price: String,
    pub limit_fee: String,
    pub client_id: String,
    /// `YYYY-MM-DDTHH:mm:ss.sssZ`
    pub expiration: String,
}

impl OrderSignParams {
    pub fn from_order(order: &ApiOrder, network_id: u64, position_id: i64) -> Self {
        Self {
            network_id,
            position_id,
            market: order.market.clone(),
            side: order.side,
            human_size: order.size.clone(),
            human_price: order.price.clone(),
            limit_fee: order.limit_fee.clone(),
            client_id: order.client_id.clone(),
            expiration: order.expiration.clone(),
        }
    }
}

/// Produces the hex STARK signature sent as `ApiOrder::signature`
pub trait StarkOrderSigner: Send + Sync + Debug {
    fn sign_order(
        &self,
        stark_private_key: &StarkPrivateKey,
        params: &OrderSignParams,
    ) -> SigningResult<String>;
}
