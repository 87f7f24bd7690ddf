//! Checkout step two: trust a payment claim, then grant access.
//!
//! The gateway signature proves the payment belongs to the order. The order
//! notes, read back from the gateway, prove the order was opened for the
//! claimed courses.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use super::enrollment_coordinator::EnrollmentCoordinator;
use super::port_errors::map_gateway_lookup_error;
use super::ports::PaymentGateway;
use super::{EnrollmentReport, Error, PaymentClaim, SignatureVerifier};

/// Verifies claim signatures and hands trusted claims to the coordinator.
#[derive(Clone)]
pub struct PaymentVerifier {
    signatures: SignatureVerifier,
    gateway: Arc<dyn PaymentGateway>,
    coordinator: EnrollmentCoordinator,
}

impl PaymentVerifier {
    pub fn new(
        signatures: SignatureVerifier,
        gateway: Arc<dyn PaymentGateway>,
        coordinator: EnrollmentCoordinator,
    ) -> Self {
        Self {
            signatures,
            gateway,
            coordinator,
        }
    }

    /// Verify `claim` and enroll on success.
    ///
    /// A signature mismatch, or an order opened for other courses, fails
    /// closed with `payment_rejected` before any ledger write. A genuine
    /// payment whose enrollment is not fully satisfied yields
    /// `enrollment_incomplete` carrying the per-course report.
    pub async fn verify(&self, claim: &PaymentClaim) -> Result<EnrollmentReport, Error> {
        if !self.signatures.verify_claim(claim) {
            warn!(
                order_id = claim.order_id(),
                user_id = %claim.user(),
                "payment signature mismatch"
            );
            return Err(Error::payment_rejected("Payment verification failed"));
        }

        let order = self
            .gateway
            .fetch_order(claim.order_id())
            .await
            .map_err(|err| {
                warn!(order_id = claim.order_id(), error = %err, "order lookup failed");
                map_gateway_lookup_error(&err)
            })?;
        if !order.covers(claim.courses()) {
            warn!(
                order_id = claim.order_id(),
                user_id = %claim.user(),
                "claimed courses differ from the paid order"
            );
            return Err(Error::payment_rejected(
                "Payment does not cover the requested courses",
            ));
        }

        let report = self.coordinator.enroll_all(&claim.user(), claim.courses()).await;
        if report.is_complete() {
            return Ok(report);
        }
        warn!(
            order_id = claim.order_id(),
            payment_id = claim.payment_id(),
            user_id = %claim.user(),
            "payment verified but enrollment incomplete"
        );
        Err(
            Error::enrollment_incomplete("Payment verified but enrollment did not complete")
                .with_details(json!({
                    "paymentVerified": true,
                    "orderId": claim.order_id(),
                    "paymentId": claim.payment_id(),
                    "courses": report.courses,
                })),
        )
    }
}
