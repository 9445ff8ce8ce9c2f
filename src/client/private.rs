//! Authenticated `/v3/` REST endpoints
//!
//! Every request carries the four `DYDX-*` headers; the signature is the
//! HMAC of timestamp, method, path (with query) and body.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::config::constants::{
    API_PATH_PREFIX, HEADER_API_KEY, HEADER_PASSPHRASE, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};
use crate::signing::{generate_now_iso, sign_request, ApiKeyCredentials, RequestDescriptor, StarkPrivateKey};

use super::errors::{ExchangeError, ExchangeResult};
use super::helpers::{generate_query_path, get_account_id};
use super::order_signer::{OrderSignParams, StarkOrderSigner};
use super::types::{
    create_http_client, Account, AccountResponse, ApiOrder, CancelOrderResponse, Order,
    OrderQueryParams, OrderResponse, OrdersResponse, Position, PositionQueryParams,
    PositionStatus, PositionsResponse,
};

/// Client for the private (API-key authenticated) endpoints
#[derive(Debug, Clone)]
pub struct PrivateClient {
    host: String,
    network_id: u64,
    credentials: ApiKeyCredentials,
    stark_private_key: Option<StarkPrivateKey>,
    order_signer: Option<Arc<dyn StarkOrderSigner>>,
    default_address: Option<String>,
    http_client: reqwest::Client,
    timeout_ms: u64,
}

impl PrivateClient {
    /// `host` without trailing slash, e.g. `https://api.dydx.exchange`
    pub fn new(
        host: impl Into<String>,
        network_id: u64,
        credentials: ApiKeyCredentials,
        timeout_ms: u64,
    ) -> Self {
        let host = host.into();
        let host = host.trim_end_matches('/').to_string();
        Self {
            host,
            network_id,
            credentials,
            stark_private_key: None,
            order_signer: None,
            default_address: None,
            http_client: create_http_client(timeout_ms),
            timeout_ms,
        }
    }

    pub fn with_stark_private_key(mut self, key: StarkPrivateKey) -> Self {
        self.stark_private_key = Some(key);
        self
    }

    pub fn with_order_signer(mut self, signer: Arc<dyn StarkOrderSigner>) -> Self {
        self.order_signer = Some(signer);
        self
    }

    /// Address used by `get_account(None)`
    pub fn with_default_address(mut self, address: impl Into<String>) -> Self {
        self.default_address = Some(address.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub fn credentials(&self) -> &ApiKeyCredentials {
        &self.credentials
    }

    pub fn stark_private_key(&self) -> Option<&StarkPrivateKey> {
        self.stark_private_key.as_ref()
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// `GET /v3/accounts/{accountId}` for `address` or the default address
    #[tracing::instrument(skip(self))]
    pub async fn get_account(&self, address: Option<&str>) -> ExchangeResult<Account> {
        let address = match address.or(self.default_address.as_deref()) {
            Some(a) => a,
            None => {
                return Err(ExchangeError::AuthenticationFailed(
                    "No Ethereum address given and no default address configured".into(),
                ))
            }
        };
        let endpoint = format!("accounts/{}", get_account_id(address));
        let resp: AccountResponse = self.get(&endpoint).await?;
        Ok(resp.account)
    }

    /// `GET /v3/positions`
    #[tracing::instrument(skip(self))]
    pub async fn get_positions(
        &self,
        market: Option<&str>,
        status: Option<PositionStatus>,
    ) -> ExchangeResult<Vec<Position>> {
        let params = PositionQueryParams { market, status };
        let endpoint = generate_query_path("positions", &params)?;
        let resp: PositionsResponse = self.get(&endpoint).await?;
        Ok(resp.positions)
    }

    /// `GET /v3/orders` with the set filters
    #[tracing::instrument(skip(self))]
    pub async fn get_orders(&self, params: &OrderQueryParams) -> ExchangeResult<Vec<Order>> {
        let endpoint = generate_query_path("orders", params)?;
        let resp: OrdersResponse = self.get(&endpoint).await?;
        Ok(resp.orders)
    }

    /// `GET /v3/orders/{id}`
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_id(&self, order_id: &str) -> ExchangeResult<Order> {
        let resp: OrderResponse = self.get(&format!("orders/{}", order_id)).await?;
        Ok(resp.order)
    }

    /// STARK-sign `order` for `position_id` and `POST /v3/orders`
    #[tracing::instrument(skip(self, order), fields(market = %order.market, client_id = %order.client_id))]
    pub async fn create_order(&self, mut order: ApiOrder, position_id: i64) -> ExchangeResult<Order> {
        let stark_key = self.stark_private_key.as_ref().ok_or_else(|| {
            ExchangeError::AuthenticationFailed("STARK private key not configured".into())
        })?;
        let signer = self.order_signer.as_ref().ok_or_else(|| {
            ExchangeError::AuthenticationFailed("STARK order signer not configured".into())
        })?;

        let params = OrderSignParams::from_order(&order, self.network_id, position_id);
        order.signature = signer.sign_order(stark_key, &params)?;

        let body = serde_json::to_string(&order)
            .map_err(|e| ExchangeError::InvalidResponse(format!("Cannot encode order: {}", e)))?;
        let resp: OrderResponse = self.send(Method::POST, "orders", body).await?;

        tracing::info!(
            exchange = "dydx",
            order_id = %resp.order.id,
            status = ?resp.order.status,
            "Order created"
        );
        Ok(resp.order)
    }

    /// `DELETE /v3/orders/{id}`
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> ExchangeResult<Order> {
        let resp: CancelOrderResponse = self
            .send(Method::DELETE, &format!("orders/{}", order_id), String::new())
            .await?;
        tracing::info!(exchange = "dydx", order_id = %order_id, "Order canceled");
        Ok(resp.cancel_order)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ExchangeResult<T> {
        self.send(Method::GET, endpoint, String::new()).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: String,
    ) -> ExchangeResult<T> {
        let text = self.execute(method, endpoint, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            ExchangeError::InvalidResponse(format!("{} - body: {}", e, text))
        })
    }

    /// Sign and send one request, returning the raw body of a 2xx response
    async fn execute(&self, method: Method, endpoint: &str, body: String) -> ExchangeResult<String> {
        let iso_timestamp = generate_now_iso();
        let request_path = format!("{}{}", API_PATH_PREFIX, endpoint);
        let signature = sign_request(
            &self.credentials.secret,
            &RequestDescriptor {
                iso_timestamp: &iso_timestamp,
                method: method.as_str(),
                request_path: &request_path,
                body: &body,
            },
        )?;

        let url = format!("{}{}", self.host, request_path);
        tracing::debug!(exchange = "dydx", method = %method, path = %request_path, "Sending request");

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(HEADER_SIGNATURE, signature)
            .header(HEADER_API_KEY, &self.credentials.key)
            .header(HEADER_TIMESTAMP, &iso_timestamp)
            .header(HEADER_PASSPHRASE, &self.credentials.passphrase)
            .header("Content-Type", "application/json");
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::from_transport(e, self.timeout_ms))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(
                exchange = "dydx",
                method = %method,
                path = %request_path,
                status = status.as_u16(),
                body = %text,
                "Request rejected"
            );
            return Err(ExchangeError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(exchange = "dydx", status = status.as_u16(), "Response received");
        Ok(text)
    }
}
