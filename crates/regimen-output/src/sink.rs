//! Result sinks for the regimen exposure table.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::info;

use regimen_core::regimen_exposure_frame;
use regimen_model::{OutputFormat, RegimenExposure, WriteReport};

use crate::atomic::write_atomic;
use crate::error::{OutputError, Result};
use crate::options::OutputOptions;

/// Persists the regimen exposure rows of one run.
pub trait ResultSink {
    /// Writes every row, honouring the sink's replacement setting.
    fn write(&mut self, rows: &[RegimenExposure]) -> Result<WriteReport>;

    /// Short description for logs and summaries.
    fn describe(&self) -> String;
}

pub(crate) fn write_csv_frame(
    data: &mut DataFrame,
    path: &Path,
    replace: bool,
) -> Result<bool> {
    write_atomic(path, replace, |file, target| {
        CsvWriter::new(file)
            .include_header(true)
            .finish(data)
            .map_err(|source| OutputError::Csv {
                path: target.to_path_buf(),
                source,
            })
    })
}

pub(crate) fn write_json_rows<T: Serialize>(rows: &[T], path: &Path, replace: bool) -> Result<bool> {
    write_atomic(path, replace, |file: &mut File, target| {
        let bytes = serde_json::to_vec_pretty(rows).map_err(|source| OutputError::Json {
            path: target.to_path_buf(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| OutputError::Io {
            operation: "write",
            path: target.to_path_buf(),
            source,
        })
    })
}

fn report(path: &Path, format: OutputFormat, rows: usize, replaced: bool) -> WriteReport {
    info!(
        path = %path.display(),
        format = format.extension(),
        rows_written = rows,
        replaced_existing = replaced,
        "regimen exposures written"
    );
    WriteReport {
        path: path.to_path_buf(),
        format,
        rows_written: rows,
        replaced_existing: replaced,
    }
}

/// Header-first CSV with one line per row.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    replace: bool,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>, replace: bool) -> Self {
        Self {
            path: path.into(),
            replace,
        }
    }
}

impl ResultSink for CsvSink {
    fn write(&mut self, rows: &[RegimenExposure]) -> Result<WriteReport> {
        let mut table = regimen_exposure_frame(rows).map_err(|source| OutputError::Frame {
            table: "regimen_exposure",
            source,
        })?;
        let replaced = write_csv_frame(&mut table.data, &self.path, self.replace)?;
        Ok(report(&self.path, OutputFormat::Csv, rows.len(), replaced))
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Pretty-printed JSON array of row objects.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
    replace: bool,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>, replace: bool) -> Self {
        Self {
            path: path.into(),
            replace,
        }
    }
}

impl ResultSink for JsonSink {
    fn write(&mut self, rows: &[RegimenExposure]) -> Result<WriteReport> {
        let replaced = write_json_rows(rows, &self.path, self.replace)?;
        Ok(report(&self.path, OutputFormat::Json, rows.len(), replaced))
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Keeps the rows of the last write in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rows: Vec<RegimenExposure>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[RegimenExposure] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<RegimenExposure> {
        self.rows
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, rows: &[RegimenExposure]) -> Result<WriteReport> {
        let replaced = self.writes > 0;
        self.rows = rows.to_vec();
        self.writes += 1;
        Ok(WriteReport {
            path: PathBuf::new(),
            format: OutputFormat::default(),
            rows_written: rows.len(),
            replaced_existing: replaced,
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// File sink for `options.format` at `path`.
pub fn sink_for(path: &Path, options: &OutputOptions) -> Box<dyn ResultSink> {
    match options.format {
        OutputFormat::Csv => Box::new(CsvSink::new(path, options.replace)),
        OutputFormat::Json => Box::new(JsonSink::new(path, options.replace)),
    }
}
