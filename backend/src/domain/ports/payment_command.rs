//! Driving port for checkout: order creation, payment verification and the
//! payment receipt e-mail.
//!
//! Inbound adapters call this port without knowing which gateway, ledger or
//! queue backs it, so handler tests substitute a mock.

use async_trait::async_trait;

use crate::domain::{
    CourseSelection, EnrollmentReport, Error, Money, OrderIntent, PaymentClaim, UserId,
};

/// Request to e-mail a payment receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceiptRequest {
    pub user: UserId,
    pub order_id: String,
    pub payment_id: String,
    pub amount: Money,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Price the selection and create a gateway order. Read-only with
    /// respect to the ledger.
    async fn create_order(
        &self,
        user: &UserId,
        courses: CourseSelection,
    ) -> Result<OrderIntent, Error>;

    /// Verify the claim signature, then enroll the user in every course.
    ///
    /// Returns `payment_rejected` on a bad signature (no writes) and
    /// `enrollment_incomplete` when the payment is genuine but at least one
    /// course could not be enrolled.
    async fn verify_payment(&self, claim: &PaymentClaim) -> Result<EnrollmentReport, Error>;

    /// Queue a payment receipt e-mail for the user.
    async fn send_payment_receipt(&self, request: PaymentReceiptRequest) -> Result<(), Error>;
}
