//! End-to-end regimen exposure pipeline.
//!
//! The [`PipelineContext`] bundles the validated catalog with the options every
//! stage reads. Stages run in a fixed order:
//!
//! 1. **Era construction**: collapse ingredient exposures into eras
//! 2. **Aggregation**: distinct ingredients per era
//! 3. **Matching**: exact set equality against the catalog
//!
//! Each stage is timed and the counts are collected into a [`PipelineSummary`].

use std::time::Instant;

use polars::prelude::PolarsResult;
use tracing::{info, info_span, warn};

use regimen_model::{
    Era, EraIngredient, ExposureRecord, IngredientAllowlist, PipelineOptions, PipelineSummary,
    RegimenCatalog, RegimenExposure, RegimenMatchCount, StageTiming,
};

use crate::aggregate::aggregate_era_ingredients;
use crate::era::build_eras;
use crate::fingerprint::output_fingerprint;
use crate::frame::{OutputTable, era_frame, era_ingredient_frame, regimen_exposure_frame};
use crate::matcher::match_regimens;
use crate::partition::PersonPartitions;

/// Catalog and options shared by all pipeline stages.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub catalog: RegimenCatalog,
    pub options: PipelineOptions,
}

impl PipelineContext {
    pub fn new(catalog: RegimenCatalog) -> Self {
        Self {
            catalog,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Ingredients the resolver must keep.
    pub fn allowlist(&self) -> IngredientAllowlist {
        self.catalog.ingredient_allowlist()
    }

    /// Runs every stage over ingredient-level exposure records.
    pub fn run(&self, records: &[ExposureRecord]) -> PipelineOutput {
        let span = info_span!(
            "regimen_pipeline",
            gap_days = self.options.gap_days,
            execution = ?self.options.execution
        );
        let _guard = span.enter();
        let mut stages = Vec::with_capacity(3);

        let started = Instant::now();
        let eras = build_eras(records, &self.options);
        stages.push(timing("build_eras", started));

        let started = Instant::now();
        let era_ingredients = aggregate_era_ingredients(&eras, records, &self.options);
        stages.push(timing("aggregate_era_ingredients", started));

        let started = Instant::now();
        let regimen_exposures =
            match_regimens(&eras, &era_ingredients, &self.catalog, &self.options);
        stages.push(timing("match_regimens", started));

        let summary = self.summarize(records, &eras, &era_ingredients, &regimen_exposures, stages);
        if summary.has_matches() {
            info!(
                regimen_exposure_count = summary.regimen_exposure_count,
                unmatched_era_count = summary.unmatched_era_count,
                "pipeline complete"
            );
        } else {
            warn!(
                era_count = summary.era_count,
                "pipeline complete without any regimen exposure"
            );
        }
        PipelineOutput {
            eras,
            era_ingredients,
            regimen_exposures,
            summary,
        }
    }

    fn summarize(
        &self,
        records: &[ExposureRecord],
        eras: &[Era],
        era_ingredients: &[EraIngredient],
        regimen_exposures: &[RegimenExposure],
        stages: Vec<StageTiming>,
    ) -> PipelineSummary {
        let regimen_counts = self
            .catalog
            .regimens()
            .map(|regimen| RegimenMatchCount {
                regimen_id: regimen.id,
                regimen_name: regimen.name.clone(),
                ingredient_count: regimen.ingredients.len(),
                matched_eras: regimen_exposures
                    .iter()
                    .filter(|row| row.regimen_id == regimen.id)
                    .count(),
            })
            .collect();
        let mut matched_eras: Vec<_> = regimen_exposures.iter().map(|row| row.era_id).collect();
        matched_eras.dedup();
        PipelineSummary {
            person_count: PersonPartitions::new(records).person_count(),
            exposure_count: records.len(),
            era_count: eras.len(),
            era_ingredient_count: era_ingredients.len(),
            regimen_exposure_count: regimen_exposures.len(),
            unmatched_era_count: eras.len().saturating_sub(matched_eras.len()),
            regimen_counts,
            stages,
            output_fingerprint: output_fingerprint(regimen_exposures),
        }
    }
}

fn timing(stage: &str, started: Instant) -> StageTiming {
    StageTiming {
        stage: stage.to_string(),
        duration_ms: started.elapsed().as_millis(),
    }
}

/// Tables and counts produced by one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub eras: Vec<Era>,
    pub era_ingredients: Vec<EraIngredient>,
    /// Sorted by era id then regimen id.
    pub regimen_exposures: Vec<RegimenExposure>,
    pub summary: PipelineSummary,
}

impl PipelineOutput {
    pub fn regimen_exposure_frame(&self) -> PolarsResult<OutputTable> {
        regimen_exposure_frame(&self.regimen_exposures)
    }

    pub fn era_frame(&self) -> PolarsResult<OutputTable> {
        era_frame(&self.eras)
    }

    pub fn era_ingredient_frame(&self) -> PolarsResult<OutputTable> {
        era_ingredient_frame(&self.era_ingredients)
    }
}

/// Runs the pipeline with an ad-hoc context.
pub fn run_pipeline(
    records: &[ExposureRecord],
    catalog: &RegimenCatalog,
    options: &PipelineOptions,
) -> PipelineOutput {
    PipelineContext::new(catalog.clone())
        .with_options(*options)
        .run(records)
}
