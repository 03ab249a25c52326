//! Output error types.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Failure while persisting a result table.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The target exists and replacement was not requested.
    #[error("output already exists: {path} (replacement disabled)")]
    TargetExists { path: PathBuf },

    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temp file was written but could not be moved over the target.
    #[error("failed to move {temp_path} into place at {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build {table} table")]
    Frame {
        table: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("failed to encode CSV for {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("failed to encode JSON for {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, OutputError>;
