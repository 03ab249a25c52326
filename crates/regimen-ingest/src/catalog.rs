//! Regimen catalog loading.

use std::path::Path;

use tracing::{debug, info};

use regimen_model::{RegimenCatalog, RegimenDefinition};

use crate::csv_table::{CsvTable, read_csv_table};
use crate::error::{IngestError, Result};
use crate::values::RowReader;

pub const REGIMEN_ID: &str = "regimen_id";
pub const REGIMEN_NAME: &str = "regimen_name";
pub const INGREDIENT_ID: &str = "ingredient_id";

/// Reads `(regimen_id, regimen_name, ingredient_id)` rows without validating them.
pub fn read_regimen_definitions(path: &Path) -> Result<Vec<RegimenDefinition>> {
    let table = read_csv_table(path)?;
    regimen_definitions_from_table(&table)
}

pub fn regimen_definitions_from_table(table: &CsvTable) -> Result<Vec<RegimenDefinition>> {
    let id_col = table.require_column(REGIMEN_ID)?;
    let name_col = table.require_column(REGIMEN_NAME)?;
    let ingredient_col = table.require_column(INGREDIENT_ID)?;

    let mut definitions = Vec::with_capacity(table.len());
    for index in 0..table.len() {
        let row = RowReader::new(table, index);
        definitions.push(RegimenDefinition {
            regimen_id: row.required(id_col, REGIMEN_ID)?,
            regimen_name: row.optional_text(Some(name_col)).unwrap_or("").to_string(),
            ingredient_id: row.optional(Some(ingredient_col), INGREDIENT_ID)?,
        });
    }
    debug!(
        path = %table.path.display(),
        definition_count = definitions.len(),
        "read regimen definitions"
    );
    Ok(definitions)
}

/// Loads and validates the regimen catalog.
///
/// A regimen id with conflicting names, a blank name, or no ingredients is
/// rejected here rather than surfacing later as a matching anomaly.
pub fn load_regimen_catalog(path: &Path) -> Result<RegimenCatalog> {
    let definitions = read_regimen_definitions(path)?;
    let catalog =
        RegimenCatalog::from_definitions(definitions).map_err(|source| IngestError::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        path = %path.display(),
        regimen_count = catalog.len(),
        ingredient_count = catalog.ingredient_allowlist().len(),
        "regimen catalog loaded"
    );
    Ok(catalog)
}
