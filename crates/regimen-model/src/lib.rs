pub mod catalog;
pub mod error;
pub mod ids;
pub mod ingredient_set;
pub mod options;
pub mod processing;
pub mod records;

pub use catalog::{Regimen, RegimenCatalog, RegimenDefinition};
pub use error::{CatalogError, ModelError, Result};
pub use ids::{DrugConceptId, EraId, IngredientId, PersonId, RegimenId};
pub use ingredient_set::{IngredientAllowlist, IngredientSet, SetComparison};
pub use options::{DEFAULT_GAP_DAYS, ExecutionMode, PipelineOptions};
pub use processing::{OutputFormat, PipelineSummary, RegimenMatchCount, StageTiming, WriteReport};
pub use records::{DrugExposure, Era, EraIngredient, ExposureRecord, RegimenExposure};
