//! Error types for drug exposure ingestion.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use regimen_model::{CatalogError, ModelError};

/// Errors that can occur while loading source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read or parse the CSV structure.
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Schema Errors ===
    /// Required column not found in the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    // === Row Errors ===
    /// A cell could not be parsed into the expected type.
    #[error("invalid {field} value '{value}' in {path} row {row}")]
    InvalidValue {
        field: String,
        value: String,
        path: PathBuf,
        row: usize,
    },

    /// A required cell is blank.
    #[error("missing {field} in {path} row {row}")]
    MissingValue {
        field: String,
        path: PathBuf,
        row: usize,
    },

    /// An exposure ends before it starts.
    #[error("exposure in {path} row {row} ends ({end}) before it starts ({start})")]
    InvalidInterval {
        path: PathBuf,
        row: usize,
        start: NaiveDate,
        end: NaiveDate,
    },

    // === Catalog Errors ===
    /// The regimen catalog failed validation.
    #[error("invalid regimen catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },

    // === Resolution Errors ===
    /// An ingredient-level record violated a model invariant.
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
