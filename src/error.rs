//! Error types for the rating pipeline.
//!
//! Per-file and per-subject failures (`Schema`, `EmptyInput`) are recoverable
//! at the batch level: the caller logs them and continues with the remaining
//! subjects. The zero-survivor variants (`NoData`, `NoValidData`,
//! `NoRatableSubjects`) and the path errors abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Configured data directory does not exist.
    #[error("data path does not exist: {}", .0.display())]
    DataPathNotFound(PathBuf),

    /// Configured data path exists but is not a directory.
    #[error("data path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// No CSV files were found in the data directory.
    #[error("no CSV files found in {}", .0.display())]
    NoData(PathBuf),

    /// Every discovered file failed to load.
    #[error("failed to load any valid subject data")]
    NoValidData,

    /// A subject file is missing one or more required columns.
    #[error("file {file} is missing required columns: {missing:?}")]
    Schema { file: String, missing: Vec<String> },

    /// A subject has zero rows at a stage that requires at least one.
    #[error("no rows for subject {0}")]
    EmptyInput(String),

    /// No subject produced a raw rating, so there is nothing to normalize.
    #[error("no subjects produced a rating")]
    NoRatableSubjects,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
