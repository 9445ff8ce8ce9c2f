//! dYdX v3 REST client
//!
//! - `dydx` - `DydxClient` facade built from `ClientOptions`
//! - `private` - authenticated `/v3/` endpoints
//! - `order_signer` - STARK order signing seam
//! - `types` - request / response types and the HTTP client builder
//! - `helpers` - account ids, query paths, client ids

pub mod dydx;
pub mod errors;
pub mod helpers;
pub mod order_signer;
pub mod private;
pub mod types;

pub use dydx::DydxClient;
pub use errors::{ExchangeError, ExchangeResult};
pub use helpers::{
    default_order_expiration, generate_query_path, get_account_id, get_user_id, random_client_id,
};
pub use order_signer::{OrderSignParams, StarkOrderSigner};
pub use private::PrivateClient;
pub use types::{
    Account, ApiOrder, Order, OrderQueryParams, OrderSide, OrderStatus, OrderType, Position,
    PositionSide, PositionStatus, TimeInForce,
};
