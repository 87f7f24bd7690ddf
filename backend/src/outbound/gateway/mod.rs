//! Reqwest-backed payment gateway adapter.
//!
//! Speaks the Razorpay orders API: `POST {base}/v1/orders` to create and
//! `GET {base}/v1/orders/{id}` to read back, both with HTTP basic auth. The adapter owns transport details only; deciding what a failure
//! means for checkout is left to the domain.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{PaymentGateway, PaymentGatewayError};
use crate::domain::{GatewayOrder, OrderRequest, SigningSecret};

use dto::{CreateOrderBody, ErrorEnvelopeDto, OrderDto};

/// Credentials for the gateway account.
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: SigningSecret,
}

/// Payment gateway adapter for one account.
pub struct RazorpayGateway {
    client: Client,
    orders_url: Url,
    credentials: GatewayCredentials,
}

impl RazorpayGateway {
    /// Build an adapter whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails when `base_url` cannot be extended with the orders path or the
    /// reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        credentials: GatewayCredentials,
        timeout: Duration,
    ) -> Result<Self, GatewayBuildError> {
        let orders_url = base_url
            .join("/v1/orders")
            .map_err(|err| GatewayBuildError::Url(err.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayBuildError::Client(err.to_string()))?;
        Ok(Self {
            client,
            orders_url,
            credentials,
        })
    }
}

/// Construction failures for [`RazorpayGateway`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayBuildError {
    #[error("invalid gateway URL: {0}")]
    Url(String),
    #[error("could not build gateway client: {0}")]
    Client(String),
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError> {
        let response = self
            .client
            .post(self.orders_url.clone())
            .basic_auth(
                &self.credentials.key_id,
                Some(self.credentials.key_secret.expose()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&CreateOrderBody::from(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let order = parse_order(body.as_ref())?;
        debug!(order_id = %order.id, amount = order.amount.minor_units(), "gateway order created");
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentGatewayError> {
        let url = order_url(&self.orders_url, order_id)?;
        let response = self
            .client
            .get(url)
            .basic_auth(
                &self.credentials.key_id,
                Some(self.credentials.key_secret.expose()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_order(body.as_ref())
    }
}

/// `{orders_url}/{order_id}` with the id percent-encoded as one segment.
fn order_url(orders_url: &Url, order_id: &str) -> Result<Url, PaymentGatewayError> {
    let mut url = orders_url.clone();
    url.path_segments_mut()
        .map_err(|()| PaymentGatewayError::transport("orders URL cannot take a path segment"))?
        .push(order_id);
    Ok(url)
}

fn parse_order(body: &[u8]) -> Result<GatewayOrder, PaymentGatewayError> {
    let decoded: OrderDto = serde_json::from_slice(body).map_err(|error| {
        PaymentGatewayError::decode(format!("invalid order payload: {error}"))
    })?;
    decoded.into_domain().map_err(PaymentGatewayError::decode)
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let description = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .and_then(|envelope| envelope.error.description)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| body_preview(body));
    PaymentGatewayError::rejected(status.as_u16(), description)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let head: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{head}...")
    } else {
        compact
    }
}
