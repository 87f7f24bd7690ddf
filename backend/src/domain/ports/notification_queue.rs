//! Domain port describing dispatch of notification jobs.
//!
//! Enqueueing never waits for delivery; a separate worker drains the queue.
use async_trait::async_trait;

use crate::domain::NotificationJob;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the queue adapter.
    pub enum NotificationQueueError {
        /// The queue is at capacity.
        Full => "notification queue is full",
        /// The consumer has shut down.
        Closed => "notification queue is closed",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Hand a job to the consumer without waiting for delivery.
    async fn enqueue(&self, job: NotificationJob) -> Result<(), NotificationQueueError>;
}

/// Drops every job. For wiring where notifications are irrelevant.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationQueue;

#[async_trait]
impl NotificationQueue for FixtureNotificationQueue {
    async fn enqueue(&self, _job: NotificationJob) -> Result<(), NotificationQueueError> {
        Ok(())
    }
}
