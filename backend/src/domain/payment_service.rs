//! Payment driving-port implementation.
//!
//! Composes the order intent builder, the payment verifier and the
//! notification queue behind [`PaymentCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::order_intent_builder::OrderIntentBuilder;
use super::payment_verifier::PaymentVerifier;
use super::port_errors::map_user_error;
use super::ports::{NotificationQueue, PaymentCommand, PaymentReceiptRequest, UserRepository};
use super::{
    CourseSelection, EnrollmentReport, Error, NotificationJob, OrderIntent, PaymentClaim, UserId,
};

/// Checkout service behind the payment endpoints.
#[derive(Clone)]
pub struct PaymentService {
    orders: OrderIntentBuilder,
    verifier: PaymentVerifier,
    users: Arc<dyn UserRepository>,
    notifications: Arc<dyn NotificationQueue>,
}

impl PaymentService {
    pub fn new(
        orders: OrderIntentBuilder,
        verifier: PaymentVerifier,
        users: Arc<dyn UserRepository>,
        notifications: Arc<dyn NotificationQueue>,
    ) -> Self {
        Self {
            orders,
            verifier,
            users,
            notifications,
        }
    }
}

#[async_trait]
impl PaymentCommand for PaymentService {
    async fn create_order(
        &self,
        user: &UserId,
        courses: CourseSelection,
    ) -> Result<OrderIntent, Error> {
        self.orders.build(user, courses).await
    }

    async fn verify_payment(&self, claim: &PaymentClaim) -> Result<EnrollmentReport, Error> {
        self.verifier.verify(claim).await
    }

    async fn send_payment_receipt(&self, request: PaymentReceiptRequest) -> Result<(), Error> {
        let PaymentReceiptRequest {
            user,
            order_id,
            payment_id,
            amount,
        } = request;
        if order_id.trim().is_empty() || payment_id.trim().is_empty() {
            return Err(Error::invalid_request("Please provide all the details"));
        }
        if !amount.is_positive() {
            return Err(Error::invalid_request("amount must be greater than zero"));
        }
        self.users
            .find_by_id(&user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;

        let job = NotificationJob::PaymentReceipt {
            user,
            order_id,
            payment_id,
            amount,
        };
        if let Err(err) = self.notifications.enqueue(job).await {
            warn!(user_id = %user, error = %err, "payment receipt not queued");
        }
        Ok(())
    }
}
