//! Notification dispatch: a bounded job queue drained by mail workers.
//!
//! ```text
//! service ──notify()──▶ NotificationQueue ──enqueue──▶ InMemoryJobStore
//!                         (never blocks)                    │ claim
//!                                                           ▼
//!                                    worker threads ──render──▶ MailTransport
//!                                          │ failure
//!                                          └─▶ retry with backoff ─▶ dead letter
//! ```

pub mod mail;
pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use procura_events::{Notification, Notifier, NotifyError};

use crate::jobs::{
    ExecutorStats, InMemoryJobStore, Job, JobExecutor, JobExecutorConfig, JobExecutorHandle,
    JobResult, JobStore, JobStoreError, RetryPolicy,
};

pub use mail::{LoggingTransport, Mail, MailTransport, RecordingTransport, TransportError};

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub from_email: String,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Undeliverable notifications kept for inspection; oldest evicted first
    pub dead_letter_capacity: usize,
    pub retry: RetryPolicy,
    pub poll_interval: Duration,
    /// Upper bound on how long shutdown keeps delivering queued mail
    pub drain_timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            from_email: "noreply@procura.local".to_string(),
            workers: 2,
            queue_capacity: 1024,
            dead_letter_capacity: 1024,
            retry: RetryPolicy::exponential(3, Duration::from_millis(500), Duration::from_secs(30)),
            poll_interval: Duration::from_millis(50),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// [`Notifier`] that turns notifications into queued delivery jobs.
#[derive(Debug)]
pub struct NotificationQueue {
    store: Arc<InMemoryJobStore>,
    retry: RetryPolicy,
}

impl NotificationQueue {
    pub fn new(store: Arc<InMemoryJobStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    pub fn store(&self) -> &Arc<InMemoryJobStore> {
        &self.store
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let kind = notification.kind;
        let job = Job::new(notification).with_retry_policy(self.retry.clone());
        match self.store.enqueue(job) {
            Ok(job_id) => {
                debug!(job_id = %job_id, kind = %kind, "notification queued");
                Ok(())
            }
            Err(JobStoreError::QueueFull { .. }) => Err(NotifyError::QueueFull),
            Err(e) => Err(NotifyError::Unavailable(e.to_string())),
        }
    }
}

/// Job handler delivering every notification kind through `transport`.
pub fn mail_handler<T>(transport: T, from: String) -> impl Fn(&Job) -> JobResult + Send + Sync + 'static
where
    T: MailTransport + 'static,
{
    move |job: &Job| match templates::render(&job.notification, &from) {
        Some(mail) => match transport.send(&mail) {
            Ok(()) => JobResult::Success,
            Err(e) => JobResult::Failure(e.to_string()),
        },
        None => {
            warn!(
                job_id = %job.id,
                kind = %job.kind(),
                "notification has no recipient, dropping"
            );
            JobResult::Success
        }
    }
}

/// Running notification pipeline: the queue to hand to services plus the
/// worker threads draining it.
#[derive(Debug)]
pub struct NotificationRuntime {
    pub queue: Arc<NotificationQueue>,
    pub workers: JobExecutorHandle,
}

impl NotificationRuntime {
    pub fn start<T>(config: &NotificationConfig, transport: T) -> std::io::Result<Self>
    where
        T: MailTransport + 'static,
    {
        let store = Arc::new(
            InMemoryJobStore::with_capacity(config.queue_capacity)
                .with_dead_letter_capacity(config.dead_letter_capacity),
        );

        let mut executor = JobExecutor::new(store.clone());
        executor.register_fallback(mail_handler(transport, config.from_email.clone()));

        let workers = executor.spawn(
            JobExecutorConfig::default()
                .with_name("notify-worker")
                .with_workers(config.workers)
                .with_poll_interval(config.poll_interval)
                .with_drain_timeout(config.drain_timeout),
        )?;

        Ok(Self {
            queue: Arc::new(NotificationQueue::new(store, config.retry.clone())),
            workers,
        })
    }

    /// Deliver what is already queued (within the drain timeout), then stop
    /// the workers.
    pub fn shutdown(self) -> ExecutorStats {
        self.workers.shutdown()
    }
}
