//! Process-wide job store.
//!
//! Jobs are inserted on submission, mutated through short closures that hold
//! the entry lock only for the duration of the update, and removed by the
//! reaper. Nothing awaits while an entry is locked.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::JobError;
use crate::export::ExportPaths;
use crate::job::{AnalysisJob, JobSnapshot, JobStatus};
use crate::pipeline::StageReporter;
use crate::report::CategoryReport;
use crate::watchdog::check_timeout;

#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<DashMap<Uuid, AnalysisJob>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: AnalysisJob) -> Uuid {
        let id = job.id;
        self.jobs.insert(id, job);
        id
    }

    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.jobs.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        self.jobs.iter().map(|entry| *entry.key()).collect()
    }

    /// Read a job under its entry lock.
    pub fn with_job<R>(&self, id: &Uuid, f: impl FnOnce(&AnalysisJob) -> R) -> Option<R> {
        self.jobs.get(id).map(|entry| f(entry.value()))
    }

    /// Mutate a job under its entry lock.
    pub fn with_job_mut<R>(&self, id: &Uuid, f: impl FnOnce(&mut AnalysisJob) -> R) -> Option<R> {
        self.jobs.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    #[must_use]
    pub fn snapshot(&self, id: &Uuid, now: DateTime<Utc>) -> Option<JobSnapshot> {
        self.with_job(id, |job| job.snapshot(now))
    }

    pub fn remove(&self, id: &Uuid) -> Option<AnalysisJob> {
        self.jobs.remove(id).map(|(_, job)| job)
    }

    /// Time out every early-state job older than `ceiling`.
    ///
    /// Returns the ids that were moved to `error`.
    pub fn sweep_timeouts(&self, ceiling: Duration, now: DateTime<Utc>) -> Vec<Uuid> {
        self.ids()
            .into_iter()
            .filter(|id| {
                self.with_job_mut(id, |job| check_timeout(job, now, ceiling))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Remove every job created more than `retention` before `now`.
    ///
    /// The removed records are returned so the caller can delete their
    /// export artifacts.
    pub fn reap(&self, retention: Duration, now: DateTime<Utc>) -> Vec<AnalysisJob> {
        let Ok(retention) = chrono::Duration::from_std(retention) else {
            return Vec::new();
        };
        let expired = |job: &AnalysisJob| now - job.created_at > retention;

        self.ids()
            .into_iter()
            .filter_map(|id| {
                self.jobs
                    .remove_if(&id, |_, job| expired(job))
                    .map(|(_, job)| job)
            })
            .collect()
    }

    /// Writer handle for the worker task that runs job `id`.
    #[must_use]
    pub fn handle(&self, id: Uuid) -> JobHandle {
        JobHandle {
            id,
            jobs: Arc::clone(&self.jobs),
        }
    }
}

/// The worker's view of its own job record.
///
/// Every write goes through the job's state machine, so a job that was
/// cancelled, timed out or reaped in the meantime is never revived.
#[derive(Clone)]
pub struct JobHandle {
    id: Uuid,
    jobs: Arc<DashMap<Uuid, AnalysisJob>>,
}

impl JobHandle {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn update(&self, f: impl FnOnce(&mut AnalysisJob) -> bool) -> Result<(), JobError> {
        match self.jobs.get_mut(&self.id).map(|mut entry| f(entry.value_mut())) {
            Some(true) => Ok(()),
            _ => Err(JobError::Halted),
        }
    }

    /// # Errors
    ///
    /// Returns [`JobError::Halted`] when the job is no longer exporting.
    pub fn complete(
        &self,
        report: Arc<CategoryReport>,
        export_paths: Option<ExportPaths>,
    ) -> Result<(), JobError> {
        self.update(|job| job.complete(report, export_paths, Utc::now()))
    }

    /// Returns `false` when the job had already finished.
    pub fn fail(&self, message: &str) -> bool {
        self.update(|job| job.fail(message, Utc::now())).is_ok()
    }
}

impl StageReporter for JobHandle {
    fn enter(&self, status: JobStatus) -> Result<(), JobError> {
        self.update(|job| job.advance(status, Utc::now()))?;
        tracing::info!(job_id = %self.id, status = %status, "job state changed");
        Ok(())
    }

    fn products_done(&self, done: usize, total: usize) -> Result<(), JobError> {
        self.update(|job| job.record_products(done, total, Utc::now()))
    }
}
