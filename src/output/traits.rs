//! Result sink trait and errors
//!
//! A sink receives each brand once it is fully assembled and decides where
//! and how it is stored.

use crate::model::Brand;
use thiserror::Error;

/// Errors that can occur while persisting a brand
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for assembled brands
///
/// Called once per brand, after the whole tree below it has been crawled.
/// A failure aborts that brand only.
pub trait ResultSink {
    fn persist(&self, brand: &Brand) -> OutputResult<()>;
}
