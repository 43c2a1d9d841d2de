//! Job executor: worker threads, retries and dead-lettering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use procura_events::NotificationKind;

use super::store::JobStore;
use super::types::{Job, JobResult, JobStatus};

/// Job handler function type.
pub type JobHandler = Box<dyn Fn(&Job) -> JobResult + Send + Sync>;

#[derive(Debug, Clone)]
pub struct JobExecutorConfig {
    /// Idle sleep between polls of an empty queue
    pub poll_interval: Duration,
    /// Number of worker threads
    pub workers: usize,
    /// Thread name prefix, also used in logs
    pub name: String,
    /// How long workers keep draining ready jobs after shutdown is requested
    pub drain_timeout: Duration,
}

impl Default for JobExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            workers: 2,
            name: "notify-worker".to_string(),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl JobExecutorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }
}

/// Executor runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExecutorStats {
    pub jobs_processed: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub jobs_dead_lettered: u64,
    pub current_running: usize,
    pub uptime_secs: u64,
}

/// Handle to the running worker threads.
#[derive(Debug)]
pub struct JobExecutorHandle {
    stop: Arc<AtomicBool>,
    workers: Vec<thread::JoinHandle<()>>,
    stats: Arc<Mutex<ExecutorStats>>,
}

impl JobExecutorHandle {
    /// Stop taking new work once the ready queue is drained (or the drain
    /// timeout passes), wait for every worker and return the final counters.
    pub fn shutdown(mut self) -> ExecutorStats {
        self.stop.store(true, Ordering::SeqCst);
        for w in self.workers.drain(..) {
            let _ = w.join();
        }
        self.stats()
    }

    pub fn stats(&self) -> ExecutorStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for JobExecutorHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Runs queued jobs with registered handlers.
///
/// Handlers are looked up by notification kind, falling back to the
/// catch-all handler if one is registered.
pub struct JobExecutor<S: JobStore> {
    store: S,
    handlers: HashMap<NotificationKind, JobHandler>,
    fallback: Option<JobHandler>,
}

impl<S: JobStore + 'static> JobExecutor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
            fallback: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn register_handler<F>(&mut self, kind: NotificationKind, handler: F)
    where
        F: Fn(&Job) -> JobResult + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Handler for kinds without a dedicated one.
    pub fn register_fallback<F>(&mut self, handler: F)
    where
        F: Fn(&Job) -> JobResult + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(handler));
    }

    fn handler_for(&self, kind: NotificationKind) -> Option<&JobHandler> {
        self.handlers.get(&kind).or(self.fallback.as_ref())
    }

    /// Start `config.workers` threads sharing this executor.
    pub fn spawn(self, config: JobExecutorConfig) -> std::io::Result<JobExecutorHandle>
    where
        S: Send + Sync,
    {
        let executor = Arc::new(self);
        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(Mutex::new(ExecutorStats::default()));
        let started = Instant::now();

        let mut workers = Vec::with_capacity(config.workers.max(1));
        for n in 0..config.workers.max(1) {
            let name = format!("{}-{n}", config.name);
            let executor = executor.clone();
            let worker_stop = stop.clone();
            let worker_stats = stats.clone();
            let timing = WorkerTiming {
                poll_interval: config.poll_interval,
                drain_timeout: config.drain_timeout,
                started,
            };

            let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
                worker_loop(&executor, &name, timing, &worker_stop, &worker_stats);
            });
            match spawned {
                Ok(join) => workers.push(join),
                Err(e) => {
                    // Stop whatever already started before reporting.
                    stop.store(true, Ordering::SeqCst);
                    for w in workers {
                        let _ = w.join();
                    }
                    return Err(e);
                }
            }
        }

        info!(executor = %config.name, workers = workers.len(), "job executor started");
        Ok(JobExecutorHandle {
            stop,
            workers,
            stats,
        })
    }

    /// Run one claimed job to completion, failure or dead letter.
    ///
    /// `job` must already be marked running (see [`JobStore::claim_next`]).
    pub fn execute_one(&self, job: &mut Job) -> Result<(), String> {
        let started = Utc::now();

        let result = match self.handler_for(job.kind()) {
            Some(handler) => handler(job),
            None => JobResult::Failure(format!("no handler for notification kind {}", job.kind())),
        };

        match result {
            JobResult::Success => {
                job.mark_completed(started);
                self.store.update(job).map_err(|e| e.to_string())?;
                debug!(job_id = %job.id, kind = %job.kind(), "job completed");
                Ok(())
            }
            JobResult::Failure(error) => {
                job.mark_failed(error.clone(), started);
                if matches!(job.status, JobStatus::DeadLettered { .. }) {
                    warn!(
                        job_id = %job.id,
                        kind = %job.kind(),
                        attempts = job.attempt,
                        error = %error,
                        "job dead-lettered"
                    );
                    self.store
                        .dead_letter(job.clone(), error.clone())
                        .map_err(|e| e.to_string())?;
                } else {
                    warn!(
                        job_id = %job.id,
                        kind = %job.kind(),
                        attempt = job.attempt,
                        error = %error,
                        "job failed, will retry"
                    );
                    self.store.update(job).map_err(|e| e.to_string())?;
                }
                Err(error)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WorkerTiming {
    poll_interval: Duration,
    drain_timeout: Duration,
    started: Instant,
}

fn worker_loop<S: JobStore + 'static>(
    executor: &JobExecutor<S>,
    name: &str,
    timing: WorkerTiming,
    stop: &AtomicBool,
    stats: &Mutex<ExecutorStats>,
) {
    debug!(worker = %name, "worker started");

    // Set once shutdown is requested; from then on the worker only runs jobs
    // that are ready right now and leaves as soon as there are none.
    let mut drain_deadline: Option<Instant> = None;

    loop {
        if drain_deadline.is_none() && stop.load(Ordering::SeqCst) {
            debug!(worker = %name, "draining ready jobs before stopping");
            drain_deadline = Some(Instant::now() + timing.drain_timeout);
        }
        if let Some(deadline) = drain_deadline {
            if Instant::now() >= deadline {
                let left = executor.store.stats().map(|s| s.pending + s.failed).unwrap_or_default();
                warn!(worker = %name, jobs_left = left, "drain timeout reached, stopping");
                break;
            }
        }

        if let Ok(mut s) = stats.lock() {
            s.uptime_secs = timing.started.elapsed().as_secs();
        }

        match executor.store.claim_next() {
            Ok(Some(mut job)) => {
                debug!(worker = %name, job_id = %job.id, kind = %job.kind(), "claimed job");
                if let Ok(mut s) = stats.lock() {
                    s.current_running += 1;
                }

                let result = executor.execute_one(&mut job);

                if let Ok(mut s) = stats.lock() {
                    s.current_running = s.current_running.saturating_sub(1);
                    s.jobs_processed += 1;
                    match (&result, &job.status) {
                        (Ok(()), _) => s.jobs_succeeded += 1,
                        (Err(_), JobStatus::DeadLettered { .. }) => {
                            s.jobs_failed += 1;
                            s.jobs_dead_lettered += 1;
                        }
                        (Err(_), _) => s.jobs_failed += 1,
                    }
                }
            }
            Ok(None) if drain_deadline.is_some() => break,
            Ok(None) => thread::sleep(timing.poll_interval),
            Err(e) => {
                error!(worker = %name, error = %e, "failed to claim job");
                if drain_deadline.is_some() {
                    break;
                }
                thread::sleep(timing.poll_interval);
            }
        }
    }

    debug!(worker = %name, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::store::InMemoryJobStore;
    use crate::jobs::types::RetryPolicy;
    use procura_events::Notification;

    fn job(kind: NotificationKind) -> Job {
        Job::new(Notification::builder(kind).field("order_id", "1").build())
    }

    #[test]
    fn execute_successful_job() {
        let store = InMemoryJobStore::arc(8);
        let mut executor = JobExecutor::new(store.clone());
        executor.register_handler(NotificationKind::OrderConfirmed, |_job| JobResult::Success);

        store.enqueue(job(NotificationKind::OrderConfirmed)).unwrap();
        let mut claimed = store.claim_next().unwrap().unwrap();

        assert!(executor.execute_one(&mut claimed).is_ok());
        assert_eq!(claimed.status, JobStatus::Completed);
        assert_eq!(store.stats().unwrap().completed, 1);
    }

    #[test]
    fn failing_job_is_retried_then_dead_lettered() {
        let store = InMemoryJobStore::arc(8);
        let mut executor = JobExecutor::new(store.clone());
        executor.register_fallback(|_job| JobResult::Failure("smtp refused".to_string()));

        let queued = job(NotificationKind::UserRegistered)
            .with_retry_policy(RetryPolicy::fixed(2, Duration::ZERO));
        let job_id = store.enqueue(queued).unwrap();

        let mut claimed = store.claim_next().unwrap().unwrap();
        assert!(executor.execute_one(&mut claimed).is_err());
        assert!(matches!(claimed.status, JobStatus::Failed { .. }));

        let mut claimed = store.claim_next().unwrap().unwrap();
        assert!(executor.execute_one(&mut claimed).is_err());
        assert!(matches!(claimed.status, JobStatus::DeadLettered { .. }));

        let dls = store.list_dead_letters(10).unwrap();
        assert_eq!(dls.len(), 1);
        assert_eq!(dls[0].job.id, job_id);
        assert!(store.claim_next().unwrap().is_none());
    }

    #[test]
    fn missing_handler_counts_as_failure() {
        let store = InMemoryJobStore::arc(8);
        let executor = JobExecutor::new(store.clone());

        store
            .enqueue(job(NotificationKind::OrderPlacedAdminAlert).with_retry_policy(RetryPolicy::fixed(1, Duration::ZERO)))
            .unwrap();
        let mut claimed = store.claim_next().unwrap().unwrap();

        let err = executor.execute_one(&mut claimed).unwrap_err();
        assert!(err.contains("order-placed-admin-alert"));
        assert_eq!(store.list_dead_letters(10).unwrap().len(), 1);
    }

    #[test]
    fn worker_pool_drains_the_queue() {
        let store = InMemoryJobStore::arc(64);
        let mut executor = JobExecutor::new(store.clone());
        executor.register_fallback(|_job| JobResult::Success);

        for _ in 0..20 {
            store.enqueue(job(NotificationKind::OrderStatusChanged)).unwrap();
        }

        let handle = executor
            .spawn(
                JobExecutorConfig::default()
                    .with_workers(3)
                    .with_poll_interval(Duration::from_millis(1)),
            )
            .unwrap();
        assert_eq!(handle.worker_count(), 3);

        let deadline = Instant::now() + Duration::from_secs(5);
        while store.stats().unwrap().completed < 20 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        let executed = handle.shutdown();

        let stats = store.stats().unwrap();
        assert_eq!(stats.completed, 20);
        assert_eq!(stats.pending + stats.running, 0);
        assert_eq!(executed.jobs_succeeded, 20);
        assert_eq!(executed.current_running, 0);
    }

    #[test]
    fn shutdown_drains_jobs_that_are_already_queued() {
        let store = InMemoryJobStore::arc(64);
        let mut executor = JobExecutor::new(store.clone());
        executor.register_fallback(|_job| JobResult::Success);

        let handle = executor
            .spawn(
                JobExecutorConfig::default()
                    .with_workers(1)
                    .with_poll_interval(Duration::from_millis(200)),
            )
            .unwrap();
        for _ in 0..10 {
            store.enqueue(job(NotificationKind::UserRegistered)).unwrap();
        }
        let executed = handle.shutdown();

        let stats = store.stats().unwrap();
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.pending, 0);
        assert_eq!(executed.jobs_processed, 10);
    }

    #[test]
    fn drain_stops_at_the_deadline() {
        let store = InMemoryJobStore::arc(64);
        let mut executor = JobExecutor::new(store.clone());
        executor.register_fallback(|_job| JobResult::Success);

        let handle = executor
            .spawn(
                JobExecutorConfig::default()
                    .with_workers(1)
                    .with_poll_interval(Duration::from_millis(200))
                    .with_drain_timeout(Duration::ZERO),
            )
            .unwrap();
        // Let the worker find the queue empty and go to sleep first.
        thread::sleep(Duration::from_millis(50));
        for _ in 0..5 {
            store.enqueue(job(NotificationKind::UserRegistered)).unwrap();
        }
        let executed = handle.shutdown();

        assert_eq!(executed.jobs_processed, 0);
        assert_eq!(store.stats().unwrap().pending, 5);
    }
}
