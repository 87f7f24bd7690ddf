//! Port for the third-party payment gateway.
//!
//! Checkout calls out twice: once to create an order and once, during
//! verification, to read it back. Both happen before any ledger write, so a
//! failure here never needs compensation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::{GatewayOrder, OrderRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The gateway did not answer within the client timeout.
        Timeout { message: String } => "payment gateway timed out: {message}",
        /// The request could not be delivered.
        Transport { message: String } => "payment gateway transport failed: {message}",
        /// The gateway answered with a non-success status.
        Rejected { status: u16, description: String } =>
            "payment gateway rejected the order with status {status}: {description}",
        /// The gateway answered with an unreadable body.
        Decode { message: String } => "payment gateway response was malformed: {message}",
    }
}

impl PaymentGatewayError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::Decode { .. } => false,
        }
    }

    /// Provider-supplied description of a rejected order.
    pub fn provider_description(&self) -> Option<&str> {
        match self {
            Self::Rejected { description, .. } if !description.trim().is_empty() => {
                Some(description)
            }
            _ => None,
        }
    }

    /// Upstream HTTP status, when the gateway produced one.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `request.amount` minor units.
    async fn create_order(&self, request: &OrderRequest)
    -> Result<GatewayOrder, PaymentGatewayError>;

    /// Read back an order created earlier. Unknown ids are `Rejected`.
    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentGatewayError>;
}

/// Deterministic gateway for development and tests.
///
/// Issues `order_<receipt>` identifiers, echoes the request back and
/// remembers every order it created. Clones share the same orders.
#[derive(Debug, Default, Clone)]
pub struct FixturePaymentGateway {
    orders: Arc<Mutex<HashMap<String, GatewayOrder>>>,
}

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError> {
        let order = GatewayOrder {
            id: format!("order_{}", request.receipt),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: request.receipt.to_string(),
            status: "created".to_owned(),
            course_digest: Some(request.course_digest.clone()),
        };
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentGatewayError> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(order_id)
            .cloned()
            .ok_or_else(|| PaymentGatewayError::rejected(404_u16, "The id provided does not exist"))
    }
}
