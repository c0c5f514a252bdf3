//! Asynchronous category analysis jobs.
//!
//! Wires discovery, review extraction and sentiment into one pipeline, runs
//! it as a background task with an explicit state machine, and exports the
//! finished report as CSV.

pub mod error;
pub mod export;
pub mod job;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod runner;
pub mod watchdog;

pub use error::{ExportError, JobError};
pub use export::{render, CsvExporter, ExportPaths, ExportView};
pub use job::{AnalysisJob, JobSnapshot, JobStatus, CANCELLED_MESSAGE};
pub use pipeline::{
    CategoryPipeline, PipelineSettings, ProductSource, ReviewSource, StageReporter,
    TracingReporter,
};
pub use registry::{JobHandle, JobRegistry};
pub use report::{CategoryReport, SkippedProduct};
pub use runner::{JobRunner, RunnerSettings, WORKER_ABORTED_MESSAGE};
pub use watchdog::check_timeout;
