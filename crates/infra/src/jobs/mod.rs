//! Notification delivery jobs with retry, backoff, and dead-letter handling.
//!
//! ## Design
//!
//! - One job per accepted [`procura_events::Notification`]
//! - Bounded queue: enqueueing never blocks, a full queue is an error
//! - Retry policy with backoff, then a dead-letter queue
//! - Several worker threads claim jobs concurrently
//!
//! ## Components
//!
//! - `Job`: a notification plus its delivery bookkeeping
//! - `JobStore`: queue + dead letters (in-memory here)
//! - `JobExecutor`: runs handlers, applies the retry policy
//! - `JobExecutorHandle`: controls the worker threads

pub mod executor;
pub mod store;
pub mod types;

pub use executor::{ExecutorStats, JobExecutor, JobExecutorConfig, JobExecutorHandle};
pub use store::{InMemoryJobStore, JobStats, JobStore, JobStoreError};
pub use types::{BackoffStrategy, DeadLetterEntry, Job, JobId, JobResult, JobStatus, RetryPolicy};
