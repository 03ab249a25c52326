//! Drug exposure ingestion utilities.
//!
//! This crate loads the source tables the regimen pipeline consumes and turns
//! raw drug exposures into ingredient-level exposure records.
//!
//! # Features
//!
//! - **CSV Loading**: Read headed CSV files with normalized, case-insensitive columns
//! - **Exposure Log**: Parse raw drug exposures, defaulting missing end dates downstream
//! - **Regimen Catalog**: Load and validate regimen definitions
//! - **Ingredient Resolution**: Roll raw drug concepts up to allowlisted ingredients
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use regimen_ingest::{load_regimen_catalog, read_drug_exposures, resolve_exposures, IdentityResolver};
//!
//! let catalog = load_regimen_catalog(Path::new("regimens.csv"))?;
//! let raw = read_drug_exposures(Path::new("drug_exposure.csv"))?;
//! let resolution = resolve_exposures(&raw, &IdentityResolver, &catalog.ingredient_allowlist())?;
//! ```

mod catalog;
mod csv_table;
mod error;
mod exposures;
mod resolver;
mod values;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv_table::{CsvTable, read_csv_table};
pub use values::parse_date;

// === Source Tables ===
pub use catalog::{load_regimen_catalog, read_regimen_definitions, regimen_definitions_from_table};
pub use exposures::{drug_exposures_from_table, read_drug_exposures};

// === Ingredient Resolution ===
pub use resolver::{
    AncestorResolver, IdentityResolver, IngredientResolver, Resolution, read_concept_ancestors,
    resolve_exposures,
};
