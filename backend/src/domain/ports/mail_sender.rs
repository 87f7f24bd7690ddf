//! Port for transactional e-mail delivery.
//!
//! Delivery is best-effort: callers log [`MailDeliveryError`] and move on.

use async_trait::async_trait;

use crate::domain::EmailMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail sender adapters.
    pub enum MailDeliveryError {
        /// The provider did not answer in time.
        Timeout { message: String } => "mail delivery timed out: {message}",
        /// The request could not be delivered.
        Transport { message: String } => "mail transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } =>
            "mail provider rejected the message with status {status}: {message}",
    }
}

/// Provider acknowledgement for a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailDeliveryError>;
}

/// Accepts every message without sending anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailSender;

#[async_trait]
impl MailSender for FixtureMailSender {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailDeliveryError> {
        Ok(DeliveryReceipt {
            message_id: format!("fixture:{}", message.to),
        })
    }
}
