//! Era construction and exact regimen matching.
//!
//! Given ingredient-level exposure records and a validated regimen catalog,
//! the pipeline collapses each person's exposures into gap-tolerant eras,
//! collects the distinct ingredients of every era, and reports the eras whose
//! ingredient set equals a regimen definition.
//!
//! Work is partitioned per person; [`regimen_model::ExecutionMode`] selects
//! between the rayon pool and a sequential loop, and both produce identical
//! output.

pub mod aggregate;
pub mod era;
pub mod fingerprint;
pub mod frame;
pub mod matcher;
mod partition;
pub mod pipeline;

pub use aggregate::{EraIngredientSets, aggregate_era_ingredients};
pub use era::{Interval, build_eras, collapse_intervals};
pub use fingerprint::output_fingerprint;
pub use frame::{
    ERA_INGREDIENT_TABLE, ERA_TABLE, OutputTable, REGIMEN_EXPOSURE_TABLE, era_frame,
    era_ingredient_frame, regimen_exposure_frame,
};
pub use matcher::{RegimenIndex, match_regimens, matches_by_comparison};
pub use partition::PersonPartitions;
pub use pipeline::{PipelineContext, PipelineOutput, run_pipeline};
