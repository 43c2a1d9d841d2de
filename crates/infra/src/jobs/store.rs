//! Job storage.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::warn;

use super::types::{DeadLetterEntry, Job, JobId, JobStatus};

/// Job store abstraction.
pub trait JobStore: Send + Sync {
    /// Enqueue a new job; fails with `QueueFull` instead of blocking.
    fn enqueue(&self, job: Job) -> Result<JobId, JobStoreError>;

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobStoreError>;

    fn update(&self, job: &Job) -> Result<(), JobStoreError>;

    /// Claim the oldest job that is ready to run and mark it running.
    fn claim_next(&self) -> Result<Option<Job>, JobStoreError>;

    /// Move a job to the dead-letter queue.
    fn dead_letter(&self, job: Job, reason: String) -> Result<(), JobStoreError>;

    fn list_dead_letters(&self, limit: usize) -> Result<Vec<DeadLetterEntry>, JobStoreError>;

    /// Put a dead-lettered job back into the queue with a fresh attempt budget.
    fn retry_dead_letter(&self, job_id: JobId) -> Result<Job, JobStoreError>;

    fn stats(&self) -> Result<JobStats, JobStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("queue is full ({capacity} jobs)")]
    QueueFull { capacity: usize },
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobStats {
    pub pending: usize,
    pub running: usize,
    pub failed: usize,
    pub completed: u64,
    pub dead_lettered: usize,
    /// Dead letters dropped to make room for newer ones
    pub dead_letters_evicted: u64,
}

#[derive(Debug, Default)]
struct QueueState {
    /// Jobs that still occupy a slot (pending, running, failed-awaiting-retry).
    jobs: HashMap<JobId, Job>,
    /// Oldest first.
    dead_letters: VecDeque<DeadLetterEntry>,
    completed: u64,
    dead_letters_evicted: u64,
}

/// Bounded in-memory job queue.
///
/// Completed jobs are dropped and only counted. Dead letters are kept until
/// retried, up to `dead_letter_capacity`; past that the oldest is evicted.
#[derive(Debug)]
pub struct InMemoryJobStore {
    capacity: usize,
    dead_letter_capacity: usize,
    state: RwLock<QueueState>,
}

impl InMemoryJobStore {
    /// Queue of `capacity` live jobs, keeping as many dead letters.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            dead_letter_capacity: capacity,
            state: RwLock::new(QueueState::default()),
        }
    }

    pub fn with_dead_letter_capacity(mut self, dead_letter_capacity: usize) -> Self {
        self.dead_letter_capacity = dead_letter_capacity;
        self
    }

    pub fn arc(capacity: usize) -> Arc<Self> {
        Arc::new(Self::with_capacity(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, QueueState>, JobStoreError> {
        self.state
            .write()
            .map_err(|_| JobStoreError::Storage("job queue lock poisoned".to_string()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, QueueState>, JobStoreError> {
        self.state
            .read()
            .map_err(|_| JobStoreError::Storage("job queue lock poisoned".to_string()))
    }
}

impl JobStore for InMemoryJobStore {
    fn enqueue(&self, job: Job) -> Result<JobId, JobStoreError> {
        let mut state = self.write()?;
        if state.jobs.len() >= self.capacity {
            return Err(JobStoreError::QueueFull {
                capacity: self.capacity,
            });
        }
        if state.jobs.contains_key(&job.id) {
            return Err(JobStoreError::AlreadyExists(job.id));
        }
        let id = job.id;
        state.jobs.insert(id, job);
        Ok(id)
    }

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobStoreError> {
        Ok(self.read()?.jobs.get(&job_id).cloned())
    }

    fn update(&self, job: &Job) -> Result<(), JobStoreError> {
        let mut state = self.write()?;
        if !state.jobs.contains_key(&job.id) {
            return Err(JobStoreError::NotFound(job.id));
        }
        if job.status == JobStatus::Completed {
            state.jobs.remove(&job.id);
            state.completed += 1;
        } else {
            state.jobs.insert(job.id, job.clone());
        }
        Ok(())
    }

    fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
        let mut state = self.write()?;
        let now = Utc::now();

        // FIFO among ready jobs.
        let next = state
            .jobs
            .values()
            .filter(|j| {
                matches!(j.status, JobStatus::Pending | JobStatus::Failed { .. }) && j.is_ready(now)
            })
            .min_by_key(|j| (j.created_at, j.id.0))
            .map(|j| j.id);

        Ok(next.and_then(|id| {
            state.jobs.get_mut(&id).map(|job| {
                job.mark_running();
                job.clone()
            })
        }))
    }

    fn dead_letter(&self, mut job: Job, reason: String) -> Result<(), JobStoreError> {
        let mut state = self.write()?;

        job.status = JobStatus::DeadLettered {
            error: reason.clone(),
            attempts: job.attempt,
        };
        job.updated_at = Utc::now();

        state.jobs.remove(&job.id);
        if self.dead_letter_capacity == 0 {
            state.dead_letters_evicted += 1;
            warn!(job_id = %job.id, kind = %job.kind(), "dead-letter queue disabled, dropping job");
            return Ok(());
        }
        while state.dead_letters.len() >= self.dead_letter_capacity {
            if let Some(evicted) = state.dead_letters.pop_front() {
                state.dead_letters_evicted += 1;
                warn!(
                    job_id = %evicted.job.id,
                    kind = %evicted.job.kind(),
                    "dead-letter queue full, evicting oldest entry"
                );
            }
        }
        state.dead_letters.push_back(DeadLetterEntry::new(job, reason));
        Ok(())
    }

    fn list_dead_letters(&self, limit: usize) -> Result<Vec<DeadLetterEntry>, JobStoreError> {
        let state = self.read()?;
        Ok(state.dead_letters.iter().take(limit).cloned().collect())
    }

    fn retry_dead_letter(&self, job_id: JobId) -> Result<Job, JobStoreError> {
        let mut state = self.write()?;
        if state.jobs.len() >= self.capacity {
            return Err(JobStoreError::QueueFull {
                capacity: self.capacity,
            });
        }

        let position = state
            .dead_letters
            .iter()
            .position(|e| e.job.id == job_id)
            .ok_or(JobStoreError::NotFound(job_id))?;
        let entry = state
            .dead_letters
            .remove(position)
            .ok_or(JobStoreError::NotFound(job_id))?;

        let mut job = entry.job;
        job.status = JobStatus::Pending;
        job.attempt = 0;
        job.scheduled_at = None;
        job.updated_at = Utc::now();
        job.history.clear();

        state.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn stats(&self) -> Result<JobStats, JobStoreError> {
        let state = self.read()?;
        let mut stats = JobStats {
            completed: state.completed,
            dead_lettered: state.dead_letters.len(),
            dead_letters_evicted: state.dead_letters_evicted,
            ..JobStats::default()
        };

        for job in state.jobs.values() {
            match &job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Failed { .. } => stats.failed += 1,
                JobStatus::Completed | JobStatus::DeadLettered { .. } => {}
            }
        }
        Ok(stats)
    }
}

impl<S> JobStore for Arc<S>
where
    S: JobStore + ?Sized,
{
    fn enqueue(&self, job: Job) -> Result<JobId, JobStoreError> {
        (**self).enqueue(job)
    }

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobStoreError> {
        (**self).get(job_id)
    }

    fn update(&self, job: &Job) -> Result<(), JobStoreError> {
        (**self).update(job)
    }

    fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
        (**self).claim_next()
    }

    fn dead_letter(&self, job: Job, reason: String) -> Result<(), JobStoreError> {
        (**self).dead_letter(job, reason)
    }

    fn list_dead_letters(&self, limit: usize) -> Result<Vec<DeadLetterEntry>, JobStoreError> {
        (**self).list_dead_letters(limit)
    }

    fn retry_dead_letter(&self, job_id: JobId) -> Result<Job, JobStoreError> {
        (**self).retry_dead_letter(job_id)
    }

    fn stats(&self) -> Result<JobStats, JobStoreError> {
        (**self).stats()
    }
}
