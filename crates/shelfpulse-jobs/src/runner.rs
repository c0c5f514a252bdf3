//! Background execution of analysis jobs.
//!
//! `submit` returns immediately; the pipeline runs on its own tokio task and
//! writes progress through a [`JobHandle`]. Polling, cancellation and result
//! retrieval only touch the registry and never wait on pipeline work.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shelfpulse_core::{AnalysisLimits, AppConfig, Category};
use uuid::Uuid;

use crate::error::JobError;
use crate::export::CsvExporter;
use crate::job::{AnalysisJob, JobSnapshot, JobStatus};
use crate::pipeline::{CategoryPipeline, StageReporter};
use crate::registry::{JobHandle, JobRegistry};
use crate::report::CategoryReport;
use crate::watchdog::check_timeout;

/// Error message for a job whose worker task panicked or was aborted.
pub const WORKER_ABORTED_MESSAGE: &str = "internal error during analysis";

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Watchdog ceiling for jobs still in an early state.
    pub job_timeout: Duration,
    /// Jobs and their exports are reaped this long after creation.
    pub retention: Duration,
}

impl RunnerSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            job_timeout: config.job_timeout(),
            retention: config.job_retention(),
        }
    }
}

#[derive(Clone)]
pub struct JobRunner {
    registry: JobRegistry,
    pipeline: Arc<CategoryPipeline>,
    exporter: CsvExporter,
    settings: RunnerSettings,
}

impl JobRunner {
    #[must_use]
    pub fn new(
        pipeline: Arc<CategoryPipeline>,
        exporter: CsvExporter,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            registry: JobRegistry::new(),
            pipeline,
            exporter,
            settings,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Register a job and start it in the background.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn submit(&self, category: Category, limits: AnalysisLimits) -> Uuid {
        let job = AnalysisJob::new(category.clone(), limits);
        let id = self.registry.insert(job);
        tracing::info!(
            job_id = %id,
            category = %category,
            max_products = limits.max_products,
            max_reviews = limits.max_reviews,
            "job submitted"
        );

        let handle = self.registry.handle(id);
        let pipeline = Arc::clone(&self.pipeline);
        let exporter = self.exporter.clone();
        let worker = {
            let handle = handle.clone();
            tokio::spawn(async move {
                execute(&pipeline, &exporter, &handle, &category, limits).await
            })
        };
        // Owns the worker's JoinHandle so a panic still fails the job.
        tokio::spawn(async move {
            match worker.await {
                Ok(Ok(())) => tracing::info!(job_id = %id, "job completed"),
                Ok(Err(JobError::Halted)) => {
                    tracing::info!(job_id = %id, "job stopped before finishing");
                }
                Ok(Err(err)) => {
                    tracing::error!(job_id = %id, error = %err, "job failed");
                    handle.fail(&err.to_string());
                }
                Err(join_err) => {
                    tracing::error!(
                        job_id = %id,
                        panicked = join_err.is_panic(),
                        "job worker aborted"
                    );
                    handle.fail(WORKER_ABORTED_MESSAGE);
                }
            }
        });
        id
    }

    /// Current state of job `id`, after giving the watchdog a chance to run.
    #[must_use]
    pub fn status(&self, id: &Uuid) -> Option<JobSnapshot> {
        let now = Utc::now();
        let ceiling = self.settings.job_timeout;
        self.registry.with_job_mut(id, |job| {
            check_timeout(job, now, ceiling);
            job.snapshot(now)
        })
    }

    /// Cooperatively cancel job `id`.
    ///
    /// The worker notices at its next stage boundary; an in-flight fetch is
    /// not interrupted.
    ///
    /// # Errors
    ///
    /// - [`JobError::NotFound`] for an unknown id.
    /// - [`JobError::AlreadyFinished`] when the job is already terminal.
    pub fn cancel(&self, id: &Uuid) -> Result<JobSnapshot, JobError> {
        let now = Utc::now();
        let outcome = self
            .registry
            .with_job_mut(id, |job| {
                if job.cancel(now) {
                    Ok(job.snapshot(now))
                } else {
                    Err(JobError::AlreadyFinished {
                        id: *id,
                        status: job.status(),
                    })
                }
            })
            .ok_or(JobError::NotFound(*id))?;
        if outcome.is_ok() {
            tracing::info!(job_id = %id, "job cancelled");
        }
        outcome
    }

    /// The finished report for job `id`.
    ///
    /// # Errors
    ///
    /// - [`JobError::NotFound`] for an unknown id.
    /// - [`JobError::NotReady`] until the job has completed.
    pub fn result(&self, id: &Uuid) -> Result<Arc<CategoryReport>, JobError> {
        self.registry
            .with_job(id, |job| {
                job.result().cloned().ok_or(JobError::NotReady {
                    id: *id,
                    status: job.status(),
                })
            })
            .ok_or(JobError::NotFound(*id))?
    }

    /// Run the watchdog over every job. Returns how many were timed out.
    pub fn sweep_timeouts(&self) -> usize {
        let timed_out = self
            .registry
            .sweep_timeouts(self.settings.job_timeout, Utc::now());
        if !timed_out.is_empty() {
            tracing::warn!(count = timed_out.len(), "watchdog timed out stalled jobs");
        }
        timed_out.len()
    }

    /// Remove expired jobs and delete their exports. Returns how many were reaped.
    pub async fn reap(&self) -> usize {
        let reaped = self.registry.reap(self.settings.retention, Utc::now());
        for job in &reaped {
            if job.status().is_terminal() {
                tracing::debug!(job_id = %job.id, status = %job.status(), "reaping job");
            } else {
                tracing::warn!(job_id = %job.id, status = %job.status(), "reaping unfinished job");
            }
            if let Some(paths) = job.export_paths() {
                if let Err(err) = self.exporter.remove(paths).await {
                    tracing::warn!(job_id = %job.id, error = %err, "failed to delete export");
                }
            }
        }
        if !reaped.is_empty() {
            tracing::info!(count = reaped.len(), "reaped expired jobs");
        }
        reaped.len()
    }
}

async fn execute(
    pipeline: &CategoryPipeline,
    exporter: &CsvExporter,
    handle: &JobHandle,
    category: &Category,
    limits: AnalysisLimits,
) -> Result<(), JobError> {
    let report = Arc::new(pipeline.run(category, limits, handle).await?);

    handle.enter(JobStatus::Exporting)?;
    let paths = exporter.write_all(handle.id(), Arc::clone(&report)).await?;
    if let Err(err) = handle.complete(report, Some(paths.clone())) {
        // Cancelled or reaped while exporting; nothing will reference the files.
        if let Err(remove_err) = exporter.remove(&paths).await {
            tracing::warn!(
                job_id = %handle.id(),
                error = %remove_err,
                "failed to delete orphaned export"
            );
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
