//! Wire shapes for the Razorpay-compatible orders API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Currency, GatewayOrder, Money, OrderRequest};

/// Notes key holding the course digest.
const COURSE_DIGEST_NOTE: &str = "course_digest";

#[derive(Debug, Serialize)]
pub(super) struct CreateOrderBody<'a> {
    pub amount: i64,
    pub currency: &'a str,
    pub receipt: String,
    pub notes: OrderNotes<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderNotes<'a> {
    pub course_digest: &'a str,
}

impl<'a> From<&'a OrderRequest> for CreateOrderBody<'a> {
    fn from(request: &'a OrderRequest) -> Self {
        Self {
            amount: request.amount.minor_units(),
            currency: request.currency.as_str(),
            receipt: request.receipt.to_string(),
            notes: OrderNotes {
                course_digest: &request.course_digest,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderDto {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    /// An object, or `[]` when the order has no notes.
    #[serde(default)]
    pub notes: Value,
}

impl OrderDto {
    pub fn into_domain(self) -> Result<GatewayOrder, String> {
        let currency = Currency::new(&self.currency)
            .map_err(|err| format!("gateway returned an invalid currency: {err}"))?;
        Ok(GatewayOrder {
            id: self.id,
            amount: Money::from_minor(self.amount),
            currency,
            receipt: self.receipt.unwrap_or_default(),
            status: self.status,
            course_digest: self
                .notes
                .get(COURSE_DIGEST_NOTE)
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }
}

/// `{"error": {"code": "...", "description": "..."}}`
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub error: ErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(default)]
    pub description: Option<String>,
}
