use anyhow::{Context, Result};
use comfy_table::Table;

use regimen_cli::pipeline::{default_output_path, run_regimen_pipeline};
use regimen_cli::types::{RunConfig, RunResult};
use regimen_ingest::load_regimen_catalog;
use regimen_model::{ExecutionMode, OutputFormat, PipelineOptions};
use regimen_output::OutputOptions;

use crate::cli::{CatalogArgs, OutputFormatArg, RunArgs};
use crate::summary::apply_table_style;

pub fn run_catalog(args: &CatalogArgs) -> Result<()> {
    let catalog = load_regimen_catalog(&args.catalog)
        .with_context(|| format!("load regimen catalog from {}", args.catalog.display()))?;
    let mut table = Table::new();
    table.set_header(vec!["Regimen", "Name", "Ingredients"]);
    apply_table_style(&mut table);
    for regimen in catalog.regimens() {
        let ingredients: Vec<String> = regimen.ingredients.iter().map(|id| id.to_string()).collect();
        table.add_row(vec![
            regimen.id.to_string(),
            regimen.name.clone(),
            ingredients.join(", "),
        ]);
    }
    println!("{table}");
    for ids in catalog.shared_ingredient_sets() {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        println!("Shared ingredient set: regimens {}", ids.join(", "));
    }
    Ok(())
}

pub fn run_regimens(args: &RunArgs) -> Result<RunResult> {
    let config = run_config_from_args(args);
    run_regimen_pipeline(&config)
}

fn run_config_from_args(args: &RunArgs) -> RunConfig {
    let format = match args.format {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
    };
    let output_options = OutputOptions::default()
        .with_format(format)
        .with_replace(!args.no_replace)
        .with_dry_run(args.dry_run)
        .with_write_intermediate(args.write_intermediate);
    let execution = if args.sequential {
        ExecutionMode::Sequential
    } else {
        ExecutionMode::Parallel
    };
    let pipeline = PipelineOptions::new()
        .with_gap_days(args.gap_days)
        .with_execution(execution);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.exposures, &output_options));
    RunConfig {
        exposures: args.exposures.clone(),
        catalog: args.catalog.clone(),
        ancestors: args.ancestors.clone(),
        output,
        pipeline,
        output_options,
    }
}
