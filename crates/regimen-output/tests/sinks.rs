//! File sink behaviour against a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::tempdir;

use regimen_core::PipelineOutput;
use regimen_model::{
    Era, EraId, EraIngredient, IngredientId, OutputFormat, PersonId, RegimenExposure, RegimenId,
};
use regimen_output::{
    CsvSink, JsonSink, MemorySink, OutputError, OutputOptions, ResultSink, intermediate_path,
    output_targets, sink_for, write_intermediate_tables,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn rows() -> Vec<RegimenExposure> {
    vec![RegimenExposure {
        era_id: EraId::new(1),
        person_id: PersonId::new(42),
        start_date: date("2020-01-01"),
        end_date: date("2020-02-05"),
        regimen_id: RegimenId::new(7),
        regimen_name: "A+B".to_string(),
    }]
}

#[test]
fn csv_sink_writes_header_and_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regimen_exposure.csv");
    let report = CsvSink::new(&path, false).write(&rows()).unwrap();
    assert_eq!(report.rows_written, 1);
    assert!(!report.replaced_existing);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "era_id,person_id,start_date,end_date,regimen_id,regimen_name\n\
         1,42,2020-01-01,2020-02-05,7,A+B\n"
    );
}

#[test]
fn csv_sink_writes_header_for_empty_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    let report = CsvSink::new(&path, true).write(&[]).unwrap();
    assert_eq!(report.rows_written, 0);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("era_id,person_id"));
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn json_sink_round_trips_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regimen_exposure.json");
    JsonSink::new(&path, true).write(&rows()).unwrap();
    let parsed: Vec<RegimenExposure> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, rows());
}

#[test]
fn existing_target_needs_replace() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regimen_exposure.csv");
    fs::write(&path, "old").unwrap();

    let error = CsvSink::new(&path, false).write(&rows()).unwrap_err();
    assert!(matches!(error, OutputError::TargetExists { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "old");

    let report = CsvSink::new(&path, true).write(&rows()).unwrap();
    assert!(report.replaced_existing);
}

#[test]
fn sink_for_follows_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");
    let options = OutputOptions::default().with_format(OutputFormat::Json);
    let mut sink = sink_for(&path, &options);
    assert!(sink.describe().starts_with("json:"));
    let report = sink.write(&rows()).unwrap();
    assert_eq!(report.format, OutputFormat::Json);
}

#[test]
fn memory_sink_keeps_last_write() {
    let mut sink = MemorySink::new();
    assert!(!sink.write(&rows()).unwrap().replaced_existing);
    assert!(sink.write(&[]).unwrap().replaced_existing);
    assert!(sink.rows().is_empty());
}

#[test]
fn intermediate_tables_land_beside_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.csv");
    let pipeline = PipelineOutput {
        eras: vec![Era {
            era_id: EraId::new(1),
            person_id: PersonId::new(42),
            start_date: date("2020-01-01"),
            end_date: date("2020-02-05"),
        }],
        era_ingredients: vec![
            EraIngredient {
                era_id: EraId::new(1),
                ingredient_id: IngredientId::new(10),
            },
            EraIngredient {
                era_id: EraId::new(1),
                ingredient_id: IngredientId::new(20),
            },
        ],
        ..PipelineOutput::default()
    };

    let reports = write_intermediate_tables(&pipeline, &output, &OutputOptions::default()).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].path, dir.path().join("results_era.csv"));
    assert_eq!(reports[1].rows_written, 2);
    assert_eq!(
        fs::read_to_string(intermediate_path(&output, "era_ingredient", OutputFormat::Csv)).unwrap(),
        "era_id,ingredient_id\n1,10\n1,20\n"
    );
}

#[test]
fn targets_follow_intermediate_option() {
    let output = Path::new("out/regimen_exposure.json");
    let options = OutputOptions::default().with_format(OutputFormat::Json);
    assert_eq!(output_targets(output, &options), vec![output.to_path_buf()]);
    let targets = output_targets(output, &options.with_write_intermediate(true));
    assert_eq!(
        targets,
        vec![
            output.to_path_buf(),
            PathBuf::from("out/regimen_exposure_era.json"),
            PathBuf::from("out/regimen_exposure_era_ingredient.json"),
        ]
    );
}
