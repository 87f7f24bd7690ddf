//! Bounded in-process notification queue.
//!
//! [`ChannelNotificationQueue`] is the producer half of a `tokio::sync::mpsc`
//! channel; a [`NotificationWorker`] task owns the receiver. Enqueueing never
//! waits: a full buffer is reported straight back to the caller.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::domain::ports::{NotificationQueue, NotificationQueueError};
use crate::domain::{NotificationJob, NotificationWorker};

/// Producer handle for the notification channel. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct ChannelNotificationQueue {
    sender: mpsc::Sender<NotificationJob>,
}

impl ChannelNotificationQueue {
    /// Create a queue buffering up to `capacity` jobs (at least one).
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Create a queue and spawn `worker` on the current runtime to drain it.
    ///
    /// The worker stops once every clone of the returned queue is dropped.
    pub fn spawn(worker: NotificationWorker, capacity: usize) -> (Self, JoinHandle<()>) {
        let (queue, receiver) = Self::new(capacity);
        let handle = tokio::spawn(worker.run(receiver));
        (queue, handle)
    }
}

#[async_trait]
impl NotificationQueue for ChannelNotificationQueue {
    async fn enqueue(&self, job: NotificationJob) -> Result<(), NotificationQueueError> {
        self.sender.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => NotificationQueueError::full(),
            TrySendError::Closed(_) => NotificationQueueError::closed(),
        })
    }
}
