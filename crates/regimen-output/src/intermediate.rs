//! Era and era-ingredient tables written alongside the main output.

use std::path::{Path, PathBuf};

use polars::prelude::PolarsResult;
use tracing::info;

use regimen_core::{ERA_INGREDIENT_TABLE, ERA_TABLE, OutputTable, PipelineOutput};
use regimen_model::{OutputFormat, WriteReport};

use crate::error::{OutputError, Result};
use crate::options::OutputOptions;
use crate::sink::{write_csv_frame, write_json_rows};

/// Path of an intermediate table: `<stem>_<table>.<ext>` beside `output`.
pub fn intermediate_path(output: &Path, table: &str, format: OutputFormat) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "regimen_exposure".to_string());
    output.with_file_name(format!("{stem}_{table}.{}", format.extension()))
}

/// Every path a run writes: `output`, then the intermediate tables when requested.
pub fn output_targets(output: &Path, options: &OutputOptions) -> Vec<PathBuf> {
    let mut targets = vec![output.to_path_buf()];
    if options.write_intermediate {
        targets.push(intermediate_path(output, ERA_TABLE, options.format));
        targets.push(intermediate_path(output, ERA_INGREDIENT_TABLE, options.format));
    }
    targets
}

/// Fails with [`OutputError::TargetExists`] when replacement is disabled and any
/// target of the run already exists, so a refused run writes nothing.
pub fn ensure_targets_available(output: &Path, options: &OutputOptions) -> Result<()> {
    if options.replace {
        return Ok(());
    }
    match output_targets(output, options)
        .into_iter()
        .find(|path| path.exists())
    {
        Some(path) => Err(OutputError::TargetExists { path }),
        None => Ok(()),
    }
}

fn frame(built: PolarsResult<OutputTable>, table: &'static str) -> Result<OutputTable> {
    built.map_err(|source| OutputError::Frame { table, source })
}

/// Writes the era and era-ingredient tables next to `output`.
pub fn write_intermediate_tables(
    pipeline: &PipelineOutput,
    output: &Path,
    options: &OutputOptions,
) -> Result<Vec<WriteReport>> {
    let mut reports = Vec::with_capacity(2);
    let era_path = intermediate_path(output, ERA_TABLE, options.format);
    let ingredient_path = intermediate_path(output, ERA_INGREDIENT_TABLE, options.format);

    let (era_replaced, ingredient_replaced) = match options.format {
        OutputFormat::Csv => {
            let mut eras = frame(pipeline.era_frame(), ERA_TABLE)?;
            let mut ingredients = frame(pipeline.era_ingredient_frame(), ERA_INGREDIENT_TABLE)?;
            (
                write_csv_frame(&mut eras.data, &era_path, options.replace)?,
                write_csv_frame(&mut ingredients.data, &ingredient_path, options.replace)?,
            )
        }
        OutputFormat::Json => (
            write_json_rows(&pipeline.eras, &era_path, options.replace)?,
            write_json_rows(&pipeline.era_ingredients, &ingredient_path, options.replace)?,
        ),
    };

    reports.push(WriteReport {
        path: era_path,
        format: options.format,
        rows_written: pipeline.eras.len(),
        replaced_existing: era_replaced,
    });
    reports.push(WriteReport {
        path: ingredient_path,
        format: options.format,
        rows_written: pipeline.era_ingredients.len(),
        replaced_existing: ingredient_replaced,
    });
    info!(table_count = reports.len(), "intermediate tables written");
    Ok(reports)
}
