use thiserror::Error;

use crate::ids::RegimenId;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {kind} value '{value}': expected an integer")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("exposure for person {person_id} ends ({end}) before it starts ({start})")]
    InvalidInterval {
        person_id: crate::ids::PersonId,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Validation failures raised while assembling a regimen catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("regimen {regimen_id} has conflicting names '{first}' and '{second}'")]
    InconsistentName {
        regimen_id: RegimenId,
        first: String,
        second: String,
    },
    #[error("regimen {regimen_id} has no ingredients")]
    EmptyRegimen { regimen_id: RegimenId },
    #[error("regimen {regimen_id} has a blank name")]
    BlankName { regimen_id: RegimenId },
}

pub type Result<T> = std::result::Result<T, ModelError>;
