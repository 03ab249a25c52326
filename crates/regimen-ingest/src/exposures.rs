//! Raw drug exposure log loading.

use std::path::Path;

use tracing::debug;

use regimen_model::DrugExposure;

use crate::csv_table::{CsvTable, read_csv_table};
use crate::error::{IngestError, Result};
use crate::values::RowReader;

pub const PERSON_ID: &str = "person_id";
pub const DRUG_CONCEPT_ID: &str = "drug_concept_id";
pub const START_DATE: &str = "drug_exposure_start_date";
pub const END_DATE: &str = "drug_exposure_end_date";
pub const DAYS_SUPPLY: &str = "days_supply";

/// First column present among `names`.
fn find_column(table: &CsvTable, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| table.column_index(name))
}

fn require_any(table: &CsvTable, names: &[&str]) -> Result<usize> {
    find_column(table, names).ok_or_else(|| IngestError::MissingColumn {
        column: names.join(" | "),
        path: table.path.clone(),
    })
}

/// Reads the raw exposure log.
///
/// Start and end columns may also be named `start_date` / `end_date`. End
/// date and days supply are optional; rows with an explicit end before the
/// start are rejected.
pub fn read_drug_exposures(path: &Path) -> Result<Vec<DrugExposure>> {
    let table = read_csv_table(path)?;
    drug_exposures_from_table(&table)
}

pub fn drug_exposures_from_table(table: &CsvTable) -> Result<Vec<DrugExposure>> {
    let person_col = table.require_column(PERSON_ID)?;
    let drug_col = require_any(table, &[DRUG_CONCEPT_ID, "ingredient_id", "concept_id"])?;
    let start_col = require_any(table, &[START_DATE, "start_date"])?;
    let end_col = find_column(table, &[END_DATE, "end_date"]);
    let supply_col = table.column_index(DAYS_SUPPLY);

    let mut exposures = Vec::with_capacity(table.len());
    for index in 0..table.len() {
        let row = RowReader::new(table, index);
        let start_date = row.required_date(start_col, START_DATE)?;
        let end_date = row.optional_date(end_col, END_DATE)?;
        if let Some(end) = end_date
            && end < start_date
        {
            return Err(IngestError::InvalidInterval {
                path: table.path.clone(),
                row: row.row_number(),
                start: start_date,
                end,
            });
        }
        exposures.push(DrugExposure {
            person_id: row.required(person_col, PERSON_ID)?,
            drug_concept_id: row.required(drug_col, DRUG_CONCEPT_ID)?,
            start_date,
            end_date,
            days_supply: row.optional_days(supply_col, DAYS_SUPPLY)?,
        });
    }
    debug!(
        path = %table.path.display(),
        exposure_count = exposures.len(),
        "read drug exposures"
    );
    Ok(exposures)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> CsvTable {
        CsvTable {
            path: PathBuf::from("exposures.csv"),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn reads_optional_columns() {
        let table = table(
            &["person_id", "drug_concept_id", "start_date", "end_date", "days_supply"],
            &[
                &["1", "10", "2020-01-01", "2020-01-05", ""],
                &["1", "20", "2020-01-03", "", "14"],
            ],
        );
        let exposures = drug_exposures_from_table(&table).unwrap();
        assert_eq!(exposures.len(), 2);
        assert_eq!(
            exposures[0].end_date,
            NaiveDate::from_ymd_opt(2020, 1, 5)
        );
        assert_eq!(exposures[1].end_date, None);
        assert_eq!(exposures[1].days_supply, Some(14));
    }

    #[test]
    fn tolerates_negative_and_decimal_supply() {
        let table = table(
            &["person_id", "drug_concept_id", "start_date", "days_supply"],
            &[&["1", "10", "2020-01-01", "-1"], &["1", "20", "2020-01-01", "30.0"]],
        );
        let exposures = drug_exposures_from_table(&table).unwrap();
        assert_eq!(exposures[0].days_supply, Some(-1));
        assert_eq!(
            exposures[0].effective_end_date(),
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
        );
        assert_eq!(
            exposures[1].effective_end_date(),
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()
        );
    }

    #[test]
    fn rejects_end_before_start() {
        let table = table(
            &["person_id", "drug_concept_id", "start_date", "end_date"],
            &[&["1", "10", "2020-01-05", "2020-01-01"]],
        );
        let error = drug_exposures_from_table(&table).unwrap_err();
        assert!(matches!(error, IngestError::InvalidInterval { row: 1, .. }));
    }

    #[test]
    fn reports_row_of_bad_value() {
        let table = table(
            &["person_id", "drug_concept_id", "start_date"],
            &[&["1", "10", "2020-01-05"], &["x", "10", "2020-01-05"]],
        );
        let error = drug_exposures_from_table(&table).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid person_id value 'x' in exposures.csv row 2"
        );
    }

    #[test]
    fn requires_start_column() {
        let table = table(&["person_id", "drug_concept_id"], &[&["1", "10"]]);
        let error = drug_exposures_from_table(&table).unwrap_err();
        assert!(matches!(error, IngestError::MissingColumn { .. }));
    }
}
