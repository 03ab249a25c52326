//! End-to-end `run` workflow against files in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use regimen_cli::pipeline::{default_output_path, run_config, run_regimen_pipeline};
use regimen_model::{OutputFormat, PipelineOptions};
use regimen_output::{OutputError, OutputOptions};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

struct Sources {
    dir: TempDir,
    exposures: PathBuf,
    catalog: PathBuf,
}

fn sources() -> Sources {
    let dir = TempDir::new().expect("temp dir");
    let exposures = write(
        dir.path(),
        "drug_exposure.csv",
        "person_id,drug_concept_id,drug_exposure_start_date,drug_exposure_end_date,days_supply\n\
         1,10,2020-01-01,,10\n\
         1,20,2020-01-25,2020-02-05,\n\
         2,10,2020-01-01,2020-01-31,\n\
         2,20,2020-01-10,2020-01-20,\n\
         2,30,2020-01-15,2020-01-16,\n\
         3,77,2020-05-01,,\n",
    );
    let catalog = write(
        dir.path(),
        "regimens.csv",
        "regimen_id,regimen_name,ingredient_id\n1,X+Y,10\n1,X+Y,20\n2,X only,10\n",
    );
    Sources {
        dir,
        exposures,
        catalog,
    }
}

#[test]
fn writes_exact_matches_as_csv() {
    let sources = sources();
    let config = run_config(
        &sources.exposures,
        &sources.catalog,
        PipelineOptions::default(),
        OutputOptions::default(),
    );
    let result = run_regimen_pipeline(&config).expect("run pipeline");

    assert_eq!(result.raw_exposure_count, 6);
    assert_eq!(result.excluded_exposure_count, 2, "ingredients 30 and 77 are not in any regimen");
    assert_eq!(result.resolver, "identity");
    assert_eq!(result.summary.era_count, 2);
    assert_eq!(result.summary.regimen_exposure_count, 2);

    let report = result.output.expect("output written");
    assert_eq!(report.path, sources.dir.path().join("regimen_exposure.csv"));
    assert_eq!(
        fs::read_to_string(&report.path).unwrap(),
        "era_id,person_id,start_date,end_date,regimen_id,regimen_name\n\
         1,1,2020-01-01,2020-02-05,1,X+Y\n\
         2,2,2020-01-01,2020-01-31,1,X+Y\n"
    );
}

#[test]
fn dry_run_writes_nothing() {
    let sources = sources();
    let options = OutputOptions::default().with_dry_run(true);
    let config = run_config(
        &sources.exposures,
        &sources.catalog,
        PipelineOptions::default(),
        options,
    );
    let result = run_regimen_pipeline(&config).expect("run pipeline");
    assert!(result.output.is_none());
    assert!(!default_output_path(&sources.exposures, &options).exists());
    assert!(result.summary.has_matches());
}

#[test]
fn no_replace_refuses_existing_output() {
    let sources = sources();
    let options = OutputOptions::default()
        .with_format(OutputFormat::Json)
        .with_replace(false);
    let config = run_config(
        &sources.exposures,
        &sources.catalog,
        PipelineOptions::sequential(),
        options,
    );
    fs::write(&config.output, "[]").unwrap();

    let error = run_regimen_pipeline(&config).unwrap_err();
    let output_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<OutputError>())
        .expect("output error in chain");
    assert!(matches!(output_error, OutputError::TargetExists { .. }));
    assert_eq!(fs::read_to_string(&config.output).unwrap(), "[]");
}

#[test]
fn no_replace_checks_every_target_before_writing() {
    let sources = sources();
    let options = OutputOptions::default()
        .with_replace(false)
        .with_write_intermediate(true);
    let config = run_config(
        &sources.exposures,
        &sources.catalog,
        PipelineOptions::default(),
        options,
    );
    let era_table = sources.dir.path().join("regimen_exposure_era.csv");
    fs::write(&era_table, "era_id\n").unwrap();

    let error = run_regimen_pipeline(&config).unwrap_err();
    let output_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<OutputError>())
        .expect("output error in chain");
    assert!(
        matches!(output_error, OutputError::TargetExists { path } if *path == era_table)
    );
    assert!(!config.output.exists(), "main output must not be written");
    assert!(
        !sources
            .dir
            .path()
            .join("regimen_exposure_era_ingredient.csv")
            .exists()
    );
    assert_eq!(fs::read_to_string(&era_table).unwrap(), "era_id\n");
}

#[test]
fn ancestors_roll_products_up_to_ingredients() {
    let sources = sources();
    let exposures = write(
        sources.dir.path(),
        "products.csv",
        "person_id,drug_concept_id,drug_exposure_start_date,days_supply\n\
         9,500,2021-01-01,30\n",
    );
    let ancestors = write(
        sources.dir.path(),
        "concept_ancestor.csv",
        "ancestor_concept_id,descendant_concept_id\n10,500\n20,500\n",
    );
    let mut config = run_config(
        &exposures,
        &sources.catalog,
        PipelineOptions::default(),
        OutputOptions::default().with_write_intermediate(true),
    );
    config.ancestors = Some(ancestors);

    let result = run_regimen_pipeline(&config).expect("run pipeline");
    assert_eq!(result.resolver, "concept_ancestor");
    assert_eq!(result.summary.exposure_count, 2);
    assert_eq!(result.summary.regimen_exposure_count, 1);
    assert_eq!(result.intermediate.len(), 2);
    assert!(sources.dir.path().join("regimen_exposure_era.csv").exists());
}

#[test]
fn invalid_catalog_is_an_error() {
    let sources = sources();
    let catalog = write(
        sources.dir.path(),
        "bad.csv",
        "regimen_id,regimen_name,ingredient_id\n1,X+Y,10\n1,Y+X,20\n",
    );
    let config = run_config(
        &sources.exposures,
        &catalog,
        PipelineOptions::default(),
        OutputOptions::default(),
    );
    let error = run_regimen_pipeline(&config).unwrap_err();
    assert!(format!("{error:#}").contains("load regimen catalog"));
}
