//! The `run` workflow: load sources, resolve ingredients, match, persist.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span, trace, warn};

use regimen_core::PipelineContext;
use regimen_ingest::{
    AncestorResolver, IdentityResolver, IngredientResolver, Resolution, load_regimen_catalog,
    read_concept_ancestors, read_drug_exposures, resolve_exposures,
};
use regimen_model::{PipelineOptions, RegimenExposure, WriteReport};
use regimen_output::{
    OutputOptions, ensure_targets_available, sink_for, write_intermediate_tables,
};

use crate::logging::redact_value;
use crate::types::{RunConfig, RunResult};

fn load_resolver(ancestors: Option<&Path>) -> Result<Box<dyn IngredientResolver>> {
    match ancestors {
        Some(path) => {
            let resolver: AncestorResolver = read_concept_ancestors(path)
                .with_context(|| format!("load concept ancestors from {}", path.display()))?;
            Ok(Box::new(resolver))
        }
        None => Ok(Box::new(IdentityResolver)),
    }
}

/// Loads and resolves the exposure log against the catalog allowlist.
pub fn ingest(config: &RunConfig, context: &PipelineContext) -> Result<(Resolution, String)> {
    let span = info_span!("ingest");
    let _guard = span.enter();
    let resolver = load_resolver(config.ancestors.as_deref())?;
    let raw = read_drug_exposures(&config.exposures)
        .with_context(|| format!("read drug exposures from {}", config.exposures.display()))?;
    let resolution = resolve_exposures(&raw, resolver.as_ref(), &context.allowlist())
        .context("resolve drug exposures to ingredients")?;
    Ok((resolution, resolver.resolver_name().to_string()))
}

/// Writes the regimen exposure table and, when requested, the intermediate tables.
pub fn write_outputs(
    config: &RunConfig,
    pipeline: &regimen_core::PipelineOutput,
) -> Result<(Option<WriteReport>, Vec<WriteReport>)> {
    let span = info_span!("output", path = %config.output.display());
    let _guard = span.enter();
    let options: &OutputOptions = &config.output_options;
    if options.dry_run {
        info!("dry run: skipping output");
        return Ok((None, Vec::new()));
    }
    ensure_targets_available(&config.output, options).context("check output targets")?;
    let mut sink = sink_for(&config.output, options);
    let report = sink
        .write(&pipeline.regimen_exposures)
        .with_context(|| format!("write {}", sink.describe()))?;
    let intermediate = if options.write_intermediate {
        write_intermediate_tables(pipeline, &config.output, options)
            .context("write intermediate tables")?
    } else {
        Vec::new()
    };
    Ok((Some(report), intermediate))
}

fn trace_rows(rows: &[RegimenExposure]) {
    for row in rows {
        trace!(
            era_id = %row.era_id,
            person_id = redact_value(&row.person_id.to_string()),
            regimen_id = %row.regimen_id,
            "regimen exposure"
        );
    }
}

/// Runs the full workflow for one configuration.
pub fn run_regimen_pipeline(config: &RunConfig) -> Result<RunResult> {
    let span = info_span!("run", gap_days = config.pipeline.gap_days);
    let _guard = span.enter();

    let catalog = load_regimen_catalog(&config.catalog)
        .with_context(|| format!("load regimen catalog from {}", config.catalog.display()))?;
    let shared_ingredient_sets = catalog.shared_ingredient_sets();
    for ids in &shared_ingredient_sets {
        warn!(regimen_ids = ?ids, "regimens share one ingredient set and will match together");
    }
    let context = PipelineContext::new(catalog).with_options(config.pipeline);

    let (resolution, resolver) = ingest(config, &context)?;
    let pipeline = context.run(&resolution.records);
    trace_rows(&pipeline.regimen_exposures);
    let (output, intermediate) = write_outputs(config, &pipeline)?;

    Ok(RunResult {
        summary: pipeline.summary,
        raw_exposure_count: resolution.raw_count,
        excluded_exposure_count: resolution.excluded_count,
        duplicate_exposure_count: resolution.duplicate_count,
        resolver,
        shared_ingredient_sets,
        output,
        intermediate,
    })
}

/// Default output location: `regimen_exposure.<ext>` beside the exposure log.
pub fn default_output_path(exposures: &Path, options: &OutputOptions) -> std::path::PathBuf {
    let dir = exposures.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("regimen_exposure.{}", options.format.extension()))
}

/// Settings with everything at its default except the given sources.
pub fn run_config(
    exposures: &Path,
    catalog: &Path,
    pipeline: PipelineOptions,
    output_options: OutputOptions,
) -> RunConfig {
    RunConfig {
        exposures: exposures.to_path_buf(),
        catalog: catalog.to_path_buf(),
        ancestors: None,
        output: default_output_path(exposures, &output_options),
        pipeline,
        output_options,
    }
}
