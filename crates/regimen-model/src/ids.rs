#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

macro_rules! concept_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                trimmed
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| ModelError::InvalidIdentifier {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

concept_id!(
    /// Identifier of a person in the exposure log.
    PersonId,
    "person_id"
);
concept_id!(
    /// Ingredient-level drug concept.
    IngredientId,
    "ingredient_id"
);
concept_id!(
    /// Raw drug concept as recorded in the exposure log, before ingredient roll-up.
    DrugConceptId,
    "drug_concept_id"
);
concept_id!(RegimenId, "regimen_id");
concept_id!(
    /// Dense era identifier, assigned after all eras are built.
    EraId,
    "era_id"
);

impl From<IngredientId> for DrugConceptId {
    fn from(value: IngredientId) -> Self {
        Self(value.get())
    }
}

impl From<DrugConceptId> for IngredientId {
    fn from(value: DrugConceptId) -> Self {
        Self(value.get())
    }
}
