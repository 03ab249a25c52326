use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ids::RegimenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimenMatchCount {
    pub regimen_id: RegimenId,
    pub regimen_name: String,
    pub ingredient_count: usize,
    pub matched_eras: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: u128,
}

/// Counts collected while the pipeline runs.
///
/// A zero `regimen_exposure_count` is a valid outcome, not a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub person_count: usize,
    pub exposure_count: usize,
    pub era_count: usize,
    pub era_ingredient_count: usize,
    pub regimen_exposure_count: usize,
    pub unmatched_era_count: usize,
    pub regimen_counts: Vec<RegimenMatchCount>,
    pub stages: Vec<StageTiming>,
    /// SHA-256 over the sorted output rows; identical input yields an identical value.
    pub output_fingerprint: String,
}

impl PipelineSummary {
    pub fn has_matches(&self) -> bool {
        self.regimen_exposure_count > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub rows_written: usize,
    pub replaced_existing: bool,
}
