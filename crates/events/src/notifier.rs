//! Notification sink abstraction (mechanics only).
//!
//! Business operations hand a [`Notification`] to a [`Notifier`] after their
//! transaction has committed. The sink is expected to enqueue and return:
//!
//! - **at-least-once**: delivery workers may retry, receivers must tolerate duplicates
//! - **no ordering**: two notifications may be delivered in either order
//! - **never blocking**: a full or unavailable sink returns an error immediately
//!
//! Callers log sink errors and carry on; a committed order is never undone
//! because a mail could not be queued.

use std::sync::{Arc, Mutex, mpsc};

use thiserror::Error;

use crate::notification::Notification;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The bounded delivery queue has no free slot.
    #[error("notification queue is full")]
    QueueFull,

    /// The sink cannot accept work at all (poisoned lock, shut down).
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// In-memory sink for tests/dev.
///
/// Keeps every accepted notification and fans it out to subscribers.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    subscribers: Mutex<Vec<mpsc::Sender<Notification>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything accepted so far, in acceptance order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }

    pub fn subscribe(&self) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        // A poisoned lock still yields a receiver; it just never gets messages.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        {
            let mut subs = self
                .subscribers
                .lock()
                .map_err(|_| NotifyError::Unavailable("subscriber lock poisoned".into()))?;
            // Drop any dead subscribers while publishing.
            subs.retain(|tx| tx.send(notification.clone()).is_ok());
        }

        self.sent
            .lock()
            .map_err(|_| NotifyError::Unavailable("recorder lock poisoned".into()))?
            .push(notification);
        Ok(())
    }
}
