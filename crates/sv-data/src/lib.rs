//! Data loading and per-user aggregation for the sleep study
//!
//! Parses the cleaned sleep log and the per-user actigraphy CSVs, reduces
//! them to one flat record per participant, and exposes the async assembler
//! that joins all loads before the explorer's first render.

pub mod assembler;
pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use assembler::{assemble, StudyData};
pub use sources::actigraph::ActivityGrid;
pub use sources::sleep_log::{HormoneSample, SleepNight, SleepSummary};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}
