//! Background maintenance jobs.
//!
//! Two recurring jobs keep the in-memory registry healthy: a watchdog sweep
//! that times out stalled jobs nobody is polling, and a reaper that drops
//! jobs past their retention window together with their CSV exports.

use std::sync::Arc;

use shelfpulse_jobs::JobRunner;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every minute, on the minute.
const WATCHDOG_CRON: &str = "0 * * * * *";
/// Every five minutes.
const REAPER_CRON: &str = "0 */5 * * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(runner: JobRunner) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let runner = Arc::new(runner);

    register_watchdog_job(&scheduler, Arc::clone(&runner)).await?;
    register_reaper_job(&scheduler, runner).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

fn cron_from_env(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Sweep early-state jobs past the timeout ceiling.
///
/// Status polls already run the watchdog for the polled job; this catches jobs
/// that no client is watching. Override with `SHELFPULSE_WATCHDOG_CRON`.
async fn register_watchdog_job(
    scheduler: &JobScheduler,
    runner: Arc<JobRunner>,
) -> Result<(), JobSchedulerError> {
    let cron = cron_from_env("SHELFPULSE_WATCHDOG_CRON", WATCHDOG_CRON);

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let runner = Arc::clone(&runner);
        Box::pin(async move {
            let timed_out = runner.sweep_timeouts();
            tracing::debug!(timed_out, "scheduler: watchdog sweep complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered watchdog job");
    Ok(())
}

/// Reap jobs older than the retention window. Override with
/// `SHELFPULSE_REAPER_CRON`.
async fn register_reaper_job(
    scheduler: &JobScheduler,
    runner: Arc<JobRunner>,
) -> Result<(), JobSchedulerError> {
    let cron = cron_from_env("SHELFPULSE_REAPER_CRON", REAPER_CRON);

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let runner = Arc::clone(&runner);
        Box::pin(async move {
            let reaped = runner.reap().await;
            tracing::debug!(reaped, "scheduler: reaper run complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered reaper job");
    Ok(())
}
