//! Timeout backstop for jobs stuck before analysis starts.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::JobError;
use crate::job::AnalysisJob;

/// Force `job` to `error` when it has sat in an early state past `ceiling`.
///
/// Elapsed time is measured from creation. Jobs that reached `analyzing` or
/// later are left alone; their progress comes from the worker itself.
/// Returns `true` when the job was timed out by this call.
pub fn check_timeout(job: &mut AnalysisJob, now: DateTime<Utc>, ceiling: Duration) -> bool {
    let status = job.status();
    if !status.is_early() {
        return false;
    }
    let Ok(ceiling_delta) = chrono::Duration::from_std(ceiling) else {
        return false;
    };
    if now - job.created_at <= ceiling_delta {
        return false;
    }

    let message = JobError::Timeout {
        ceiling_secs: ceiling.as_secs(),
        status,
    }
    .to_string();
    tracing::warn!(job_id = %job.id, status = %status, "watchdog timed out job");
    job.fail(message, now)
}
