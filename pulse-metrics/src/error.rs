use pulse_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("invalid month {0}: must be between 0 and 11")]
    InvalidMonth(u32),

    #[error("unsupported year {0}")]
    InvalidYear(i32),
}
