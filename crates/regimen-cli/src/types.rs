use std::path::PathBuf;

use regimen_model::{PipelineOptions, PipelineSummary, RegimenId, WriteReport};
use regimen_output::OutputOptions;

/// Inputs and settings of one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub exposures: PathBuf,
    pub catalog: PathBuf,
    /// Concept-ancestor table; without it drug concepts are taken as ingredients.
    pub ancestors: Option<PathBuf>,
    pub output: PathBuf,
    pub pipeline: PipelineOptions,
    pub output_options: OutputOptions,
}

#[derive(Debug)]
pub struct RunResult {
    pub summary: PipelineSummary,
    pub raw_exposure_count: usize,
    pub excluded_exposure_count: usize,
    pub duplicate_exposure_count: usize,
    pub resolver: String,
    /// Regimen ids sharing one ingredient set; each still matches independently.
    pub shared_ingredient_sets: Vec<Vec<RegimenId>>,
    /// `None` on a dry run.
    pub output: Option<WriteReport>,
    pub intermediate: Vec<WriteReport>,
}
