use shelfpulse_sentiment::SentimentError;
use thiserror::Error;
use uuid::Uuid;

use crate::job::JobStatus;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("no products found for category \"{category}\"")]
    DiscoveryExhausted { category: String },

    #[error("no product had usable reviews")]
    NoAnalyzableProducts,

    #[error("analysis timed out after {ceiling_secs}s while {status}")]
    Timeout { ceiling_secs: u64, status: JobStatus },

    /// The job was cancelled, timed out or reaped while the worker was busy.
    #[error("job is no longer running")]
    Halted,

    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("job {id} has no result yet (status {status})")]
    NotReady { id: Uuid, status: JobStatus },

    #[error("job {id} already finished with status {status}")]
    AlreadyFinished { id: Uuid, status: JobStatus },

    #[error("aggregation failed: {0}")]
    Aggregation(#[from] SentimentError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(String),
}
