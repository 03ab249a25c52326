//! Polars projections of the pipeline tables.
//!
//! Identifiers become `i64` columns and dates become ISO-8601 strings, which
//! is the layout every sink writes.

use polars::prelude::{Column, DataFrame, PolarsResult};

use regimen_model::{Era, EraIngredient, RegimenExposure};

pub const REGIMEN_EXPOSURE_TABLE: &str = "regimen_exposure";
pub const ERA_TABLE: &str = "era";
pub const ERA_INGREDIENT_TABLE: &str = "era_ingredient";

/// A named output table.
#[derive(Debug, Clone)]
pub struct OutputTable {
    pub name: String,
    pub data: DataFrame,
}

impl OutputTable {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }
}

/// `{era_id, person_id, start_date, end_date, regimen_id, regimen_name}`.
pub fn regimen_exposure_frame(rows: &[RegimenExposure]) -> PolarsResult<OutputTable> {
    let columns = vec![
        Column::new("era_id".into(), rows.iter().map(|r| r.era_id.get()).collect::<Vec<_>>()),
        Column::new(
            "person_id".into(),
            rows.iter().map(|r| r.person_id.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "start_date".into(),
            rows.iter().map(|r| r.start_date.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "end_date".into(),
            rows.iter().map(|r| r.end_date.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "regimen_id".into(),
            rows.iter().map(|r| r.regimen_id.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "regimen_name".into(),
            rows.iter().map(|r| r.regimen_name.as_str()).collect::<Vec<_>>(),
        ),
    ];
    Ok(OutputTable::new(REGIMEN_EXPOSURE_TABLE, DataFrame::new(columns)?))
}

/// `{era_id, person_id, start_date, end_date}`.
pub fn era_frame(eras: &[Era]) -> PolarsResult<OutputTable> {
    let columns = vec![
        Column::new("era_id".into(), eras.iter().map(|e| e.era_id.get()).collect::<Vec<_>>()),
        Column::new(
            "person_id".into(),
            eras.iter().map(|e| e.person_id.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "start_date".into(),
            eras.iter().map(|e| e.start_date.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "end_date".into(),
            eras.iter().map(|e| e.end_date.to_string()).collect::<Vec<_>>(),
        ),
    ];
    Ok(OutputTable::new(ERA_TABLE, DataFrame::new(columns)?))
}

/// `{era_id, ingredient_id}`.
pub fn era_ingredient_frame(rows: &[EraIngredient]) -> PolarsResult<OutputTable> {
    let columns = vec![
        Column::new("era_id".into(), rows.iter().map(|r| r.era_id.get()).collect::<Vec<_>>()),
        Column::new(
            "ingredient_id".into(),
            rows.iter().map(|r| r.ingredient_id.get()).collect::<Vec<_>>(),
        ),
    ];
    Ok(OutputTable::new(ERA_INGREDIENT_TABLE, DataFrame::new(columns)?))
}
