//! Background job tracking for pipesh.
//!
//! Provides the `JobRegistry` for pipelines started with `&`. Jobs are
//! addressed by their 1-based position in the live listing, the same
//! numbers `repl_jobs` prints.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use super::pipeline::{PipelineResult, RunningPipeline};
use crate::error::{ShellError, ShellResult};

/// Unique identifier for a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Terminal stage still running.
    Running,
    /// Cancelled by `kill`.
    Killed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Killed => write!(f, "Killed"),
        }
    }
}

/// Information about a job for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job ID.
    pub id: JobId,
    /// 1-based position in the listing the info was taken from.
    pub position: usize,
    /// Command line, without the trailing `&`.
    pub command: String,
    /// Current status.
    pub status: JobStatus,
}

struct Job {
    id: JobId,
    pipeline: RunningPipeline,
}

impl Job {
    fn info(&self, position: usize) -> JobInfo {
        let status = if self.pipeline.is_cancelled() {
            JobStatus::Killed
        } else {
            JobStatus::Running
        };
        JobInfo {
            id: self.id,
            position,
            command: self.pipeline.command().to_string(),
            status,
        }
    }
}

/// Registry of background pipelines.
pub struct JobRegistry {
    /// Counter for generating unique job IDs.
    next_id: AtomicU64,
    /// Jobs in start order.
    jobs: Mutex<Vec<Job>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Track a pipeline that is already running.
    pub async fn register(&self, pipeline: RunningPipeline) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        tracing::debug!(job = %id, command = %pipeline.command(), "background job started");
        self.jobs.lock().await.push(Job { id, pipeline });
        id
    }

    /// Live jobs in start order, numbered from 1.
    ///
    /// Finished jobs are dropped first, so the numbers are always dense.
    pub async fn list(&self) -> Vec<JobInfo> {
        let mut jobs = self.jobs.lock().await;
        prune_finished(&mut jobs);
        jobs.iter()
            .enumerate()
            .map(|(i, job)| job.info(i + 1))
            .collect()
    }

    /// Cancel the job at 1-based `position` in the live listing.
    ///
    /// The job leaves the registry immediately; its workers stop at their
    /// next read or write.
    pub async fn kill(&self, position: usize) -> ShellResult<JobInfo> {
        let mut jobs = self.jobs.lock().await;
        prune_finished(&mut jobs);
        if position == 0 || position > jobs.len() {
            return Err(ShellError::NoSuchJob(position));
        }

        let job = jobs.remove(position - 1);
        job.pipeline.cancel();
        let info = job.info(position);
        tracing::debug!(job = %job.id, command = %info.command, "background job killed");

        // Let the workers wind down without holding up the caller.
        tokio::spawn(job.pipeline.wait());
        Ok(info)
    }

    /// Drop jobs whose terminal stage has ended.
    pub async fn prune(&self) {
        prune_finished(&mut *self.jobs.lock().await);
    }

    /// Number of live jobs.
    pub async fn len(&self) -> usize {
        let mut jobs = self.jobs.lock().await;
        prune_finished(&mut jobs);
        jobs.len()
    }

    /// Whether no job is live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Wait for every tracked job, in start order, and empty the registry.
    pub async fn wait_all(&self) -> Vec<(JobId, PipelineResult)> {
        let jobs = std::mem::take(&mut *self.jobs.lock().await);
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            results.push((job.id, job.pipeline.wait().await));
        }
        results
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

fn prune_finished(jobs: &mut Vec<Job>) {
    jobs.retain(|job| {
        let done = job.pipeline.is_finished();
        if done {
            tracing::trace!(job = %job.id, "background job finished");
        }
        !done
    });
}
