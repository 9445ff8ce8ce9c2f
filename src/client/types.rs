//! Private API request and response types
//!
//! Numeric quantities stay as the decimal strings the API returns; helpers
//! parse the few that callers need as numbers.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// Enums
// =============================================================================

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLimit,
    TrailingStop,
    TakeProfit,
    Liquidated,
    Liquidation,
    /// Any type this client does not know yet; never sent
    #[serde(other)]
    Unknown,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopLimit => "STOP_LIMIT",
            OrderType::TrailingStop => "TRAILING_STOP",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::Liquidated => "LIQUIDATED",
            OrderType::Liquidation => "LIQUIDATION",
            OrderType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good til time
    Gtt,
    /// Fill or kill
    Fok,
    /// Immediate or cancel
    Ioc,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Open,
    Filled,
    Canceled,
    Untriggered,
    BestEffortCanceled,
    BestEffortOpened,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Open => "OPEN",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Untriggered => "UNTRIGGERED",
            OrderStatus::BestEffortCanceled => "BEST_EFFORT_CANCELED",
            OrderStatus::BestEffortOpened => "BEST_EFFORT_OPENED",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Closed,
    Liquidated,
    #[serde(other)]
    Unknown,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Open => "OPEN",
            PositionStatus::Closed => "CLOSED",
            PositionStatus::Liquidated => "LIQUIDATED",
            PositionStatus::Unknown => "UNKNOWN",
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub account: Account,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub stark_key: String,
    /// Decimal string on the wire
    pub position_id: String,
    pub equity: String,
    pub free_collateral: String,
    pub quote_balance: String,
    pub pending_deposits: String,
    pub pending_withdrawals: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub open_positions: HashMap<String, Position>,
    #[serde(default)]
    pub account_number: Option<String>,
}

impl Account {
    /// Position id as used when signing orders
    pub fn position_id(&self) -> ExchangeResult<i64> {
        self.position_id.parse::<i64>().map_err(|e| {
            ExchangeError::InvalidResponse(format!(
                "Invalid positionId '{}': {}",
                self.position_id, e
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub market: String,
    pub status: PositionStatus,
    pub side: PositionSide,
    pub size: String,
    pub max_size: String,
    pub entry_price: String,
    pub exit_price: Option<String>,
    pub unrealized_pnl: String,
    pub realized_pnl: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub net_funding: String,
    pub sum_open: String,
    pub sum_close: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    pub cancel_order: Order,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub account_id: String,
    pub market: String,
    pub side: OrderSide,
    pub price: String,
    pub trigger_price: Option<String>,
    pub trailing_percent: Option<String>,
    pub size: String,
    pub remaining_size: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub created_at: DateTime<Utc>,
    pub unfillable_at: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    pub post_only: bool,
    pub cancel_reason: Option<String>,
}

// =============================================================================
// Requests
// =============================================================================

/// Filters for `GET /v3/orders`. Unset fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<OrderSide>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before_or_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_latest_orders: Option<bool>,
}

/// Query for `GET /v3/positions`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct PositionQueryParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PositionStatus>,
}

/// Order body for `POST /v3/orders`; `signature` is filled in by the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrder {
    pub market: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub size: String,
    pub price: String,
    pub client_id: String,
    pub time_in_force: TimeInForce,
    pub post_only: bool,
    pub limit_fee: String,
    /// `YYYY-MM-DDTHH:mm:ss.sssZ`
    pub expiration: String,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_percent: Option<String>,
}

impl ApiOrder {
    /// Unsigned good-til-time limit order
    pub fn limit(
        market: impl Into<String>,
        side: OrderSide,
        size: impl Into<String>,
        price: impl Into<String>,
        limit_fee: impl Into<String>,
        client_id: impl Into<String>,
        expiration: impl Into<String>,
    ) -> Self {
        Self {
            market: market.into(),
            side,
            order_type: OrderType::Limit,
            size: size.into(),
            price: price.into(),
            client_id: client_id.into(),
            time_in_force: TimeInForce::Gtt,
            post_only: false,
            limit_fee: limit_fee.into(),
            expiration: expiration.into(),
            signature: String::new(),
            cancel_id: None,
            trigger_price: None,
            trailing_percent: None,
        }
    }
}

// =============================================================================
// HTTP client builder
// =============================================================================

/// HTTP connection timeout (milliseconds)
const HTTP_CONNECT_TIMEOUT_MS: u64 = 1500;
/// Max idle connections per host in connection pool
const HTTP_POOL_MAX_IDLE: usize = 5;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Build the pooled `reqwest` client shared by all private API calls
pub fn create_http_client(timeout_ms: u64) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS.min(timeout_ms)))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .user_agent(crate::config::constants::USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(
                phase = "init",
                exchange = "dydx",
                error = %e,
                "HTTP client builder failed, falling back to reqwest defaults"
            );
            reqwest::Client::new()
        });
    tracing::info!(
        phase = "init",
        exchange = "dydx",
        timeout_ms,
        pool_max_idle = HTTP_POOL_MAX_IDLE,
        "HTTP client configured"
    );
    client
}
