//! Delivers queued notification jobs through a [`MailSender`].
//!
//! Jobs are processed one at a time. Every failure is logged and dropped;
//! nothing here is ever surfaced to the request that queued the job.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::port_errors::map_user_error;
use super::ports::{DeliveryReceipt, MailSender, UserRepository};
use super::NotificationJob;

/// Why a job was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailure {
    #[error("recipient could not be resolved: {0}")]
    Recipient(String),
    #[error("recipient no longer exists")]
    UnknownRecipient,
    #[error("mail delivery timed out after {0:?}")]
    TimedOut(Duration),
    #[error("mail delivery failed: {0}")]
    Mail(String),
}

/// Sequential consumer of [`NotificationJob`]s.
#[derive(Clone)]
pub struct NotificationWorker {
    users: Arc<dyn UserRepository>,
    mail: Arc<dyn MailSender>,
    send_timeout: Duration,
}

impl NotificationWorker {
    pub fn new(
        users: Arc<dyn UserRepository>,
        mail: Arc<dyn MailSender>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            users,
            mail,
            send_timeout,
        }
    }

    /// Resolve the recipient, render and send one job.
    pub async fn deliver(&self, job: &NotificationJob) -> Result<DeliveryReceipt, DeliveryFailure> {
        let recipient = self
            .users
            .find_by_id(&job.user())
            .await
            .map_err(|err| DeliveryFailure::Recipient(map_user_error(err).message().to_owned()))?
            .ok_or(DeliveryFailure::UnknownRecipient)?;
        let message = job.render(&recipient);
        match tokio::time::timeout(self.send_timeout, self.mail.send(&message)).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(err)) => Err(DeliveryFailure::Mail(err.to_string())),
            Err(_) => Err(DeliveryFailure::TimedOut(self.send_timeout)),
        }
    }

    /// Drain `jobs` until every sender is dropped.
    pub async fn run(self, mut jobs: mpsc::Receiver<NotificationJob>) {
        while let Some(job) = jobs.recv().await {
            let user = job.user();
            match self.deliver(&job).await {
                Ok(receipt) => info!(
                    user_id = %user,
                    job = job.kind(),
                    message_id = %receipt.message_id,
                    "notification sent"
                ),
                Err(failure) => warn!(
                    user_id = %user,
                    job = job.kind(),
                    error = %failure,
                    "notification dropped"
                ),
            }
        }
        debug!("notification queue closed; worker stopping");
    }
}
