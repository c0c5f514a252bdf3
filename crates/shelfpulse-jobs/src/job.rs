//! The analysis job record and its state machine.
//!
//! `starting → initializing → searching → analyzing → exporting → completed`,
//! with `error` reachable from every non-terminal state. `completed` and
//! `error` are absorbing: once a job lands there nothing moves it again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfpulse_core::{AnalysisLimits, Category};
use uuid::Uuid;

use crate::export::ExportPaths;
use crate::report::CategoryReport;

/// Error message recorded when a caller cancels a job.
pub const CANCELLED_MESSAGE: &str = "cancelled by user";

/// Progress span covered by the per-product loop while analyzing.
const ANALYZING_START: u8 = 20;
const ANALYZING_SPAN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Initializing,
    Searching,
    Analyzing,
    Exporting,
    Completed,
    Error,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Initializing => "initializing",
            JobStatus::Searching => "searching",
            JobStatus::Analyzing => "analyzing",
            JobStatus::Exporting => "exporting",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// States the watchdog is allowed to time out.
    #[must_use]
    pub fn is_early(self) -> bool {
        matches!(
            self,
            JobStatus::Starting | JobStatus::Initializing | JobStatus::Searching
        )
    }

    /// Progress reported on entering this state.
    #[must_use]
    pub fn milestone(self) -> u8 {
        match self {
            JobStatus::Starting | JobStatus::Error => 0,
            JobStatus::Initializing => 5,
            JobStatus::Searching => 15,
            JobStatus::Analyzing => ANALYZING_START,
            JobStatus::Exporting => 85,
            JobStatus::Completed => 100,
        }
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Starting => 0,
            JobStatus::Initializing => 1,
            JobStatus::Searching => 2,
            JobStatus::Analyzing => 3,
            JobStatus::Exporting => 4,
            JobStatus::Completed => 5,
            JobStatus::Error => 6,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub id: Uuid,
    pub category: Category,
    pub limits: AnalysisLimits,
    pub created_at: DateTime<Utc>,
    status: JobStatus,
    progress: u8,
    error: Option<String>,
    result: Option<Arc<CategoryReport>>,
    export_paths: Option<ExportPaths>,
    updated_at: DateTime<Utc>,
}

impl AnalysisJob {
    #[must_use]
    pub fn new(category: Category, limits: AnalysisLimits) -> Self {
        Self::new_at(Uuid::new_v4(), category, limits, Utc::now())
    }

    #[must_use]
    pub fn new_at(
        id: Uuid,
        category: Category,
        limits: AnalysisLimits,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            category,
            limits,
            created_at,
            status: JobStatus::Starting,
            progress: JobStatus::Starting.milestone(),
            error: None,
            result: None,
            export_paths: None,
            updated_at: created_at,
        }
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&Arc<CategoryReport>> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn export_paths(&self) -> Option<&ExportPaths> {
        self.export_paths.as_ref()
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move forward to a later working state.
    ///
    /// Returns `false` without changing anything when the job is terminal,
    /// `next` is terminal, or `next` is not ahead of the current state.
    pub fn advance(&mut self, next: JobStatus, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() || next.is_terminal() || next.rank() <= self.status.rank() {
            return false;
        }
        self.status = next;
        self.progress = self.progress.max(next.milestone());
        self.updated_at = now;
        true
    }

    /// Record per-product progress while analyzing.
    pub fn record_products(&mut self, done: usize, total: usize, now: DateTime<Utc>) -> bool {
        if self.status != JobStatus::Analyzing {
            return false;
        }
        let span = ANALYZING_SPAN * done.min(total) / total.max(1);
        let progress = ANALYZING_START.saturating_add(u8::try_from(span).unwrap_or(u8::MAX));
        self.progress = self.progress.max(progress);
        self.updated_at = now;
        true
    }

    /// Finish successfully. Only valid from `exporting`.
    pub fn complete(
        &mut self,
        report: Arc<CategoryReport>,
        export_paths: Option<ExportPaths>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.status != JobStatus::Exporting {
            return false;
        }
        self.status = JobStatus::Completed;
        self.progress = JobStatus::Completed.milestone();
        self.result = Some(report);
        self.export_paths = export_paths;
        self.updated_at = now;
        true
    }

    /// Move to `error` with `message`. Progress is left where it was.
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Error;
        self.error = Some(message.into());
        self.updated_at = now;
        true
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> bool {
        self.fail(CANCELLED_MESSAGE, now)
    }

    /// Seconds since submission, never negative.
    #[must_use]
    pub fn running_time_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.created_at).num_seconds()).unwrap_or(0)
    }

    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            category: self.category.clone(),
            limits: self.limits,
            status: self.status,
            progress: self.progress,
            error: self.error.clone(),
            has_result: self.result.is_some(),
            running_time_secs: self.running_time_secs(now),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only view of a job for status polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub category: Category,
    pub limits: AnalysisLimits,
    pub status: JobStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub has_result: bool,
    pub running_time_secs: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
