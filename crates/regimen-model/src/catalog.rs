//! Regimen catalog: named, fixed ingredient combinations.
//!
//! The catalog is assembled from flat [`RegimenDefinition`] rows and validated
//! once, so every [`Regimen`] downstream is guaranteed to carry exactly one
//! non-blank name and at least one ingredient.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::{IngredientId, RegimenId};
use crate::ingredient_set::{IngredientAllowlist, IngredientSet};

/// One `(regimen, ingredient)` row of a regimen definition table.
///
/// `ingredient_id` is optional so that a source row naming a regimen without an
/// ingredient survives loading and is reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimenDefinition {
    pub regimen_id: RegimenId,
    pub regimen_name: String,
    pub ingredient_id: Option<IngredientId>,
}

impl RegimenDefinition {
    pub fn new(regimen_id: i64, regimen_name: impl Into<String>, ingredient_id: i64) -> Self {
        Self {
            regimen_id: RegimenId::new(regimen_id),
            regimen_name: regimen_name.into(),
            ingredient_id: Some(IngredientId::new(ingredient_id)),
        }
    }
}

/// A validated regimen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regimen {
    pub id: RegimenId,
    pub name: String,
    pub ingredients: IngredientSet,
}

/// Validated collection of regimens keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimenCatalog {
    regimens: BTreeMap<RegimenId, Regimen>,
}

impl RegimenCatalog {
    /// Groups definition rows by regimen id and validates each group.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = RegimenDefinition>,
    {
        let mut regimens: BTreeMap<RegimenId, Regimen> = BTreeMap::new();
        for definition in definitions {
            let name = definition.regimen_name.trim();
            if name.is_empty() {
                return Err(CatalogError::BlankName {
                    regimen_id: definition.regimen_id,
                });
            }
            let regimen = regimens
                .entry(definition.regimen_id)
                .or_insert_with(|| Regimen {
                    id: definition.regimen_id,
                    name: name.to_string(),
                    ingredients: IngredientSet::new(),
                });
            if regimen.name != name {
                return Err(CatalogError::InconsistentName {
                    regimen_id: definition.regimen_id,
                    first: regimen.name.clone(),
                    second: name.to_string(),
                });
            }
            if let Some(ingredient) = definition.ingredient_id {
                regimen.ingredients.insert(ingredient);
            }
        }
        if let Some(empty) = regimens.values().find(|regimen| regimen.ingredients.is_empty()) {
            return Err(CatalogError::EmptyRegimen {
                regimen_id: empty.id,
            });
        }
        Ok(Self { regimens })
    }

    pub fn get(&self, id: RegimenId) -> Option<&Regimen> {
        self.regimens.get(&id)
    }

    /// Regimens in ascending id order.
    pub fn regimens(&self) -> impl Iterator<Item = &Regimen> {
        self.regimens.values()
    }

    pub fn len(&self) -> usize {
        self.regimens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regimens.is_empty()
    }

    /// Every ingredient referenced by any regimen.
    pub fn ingredient_allowlist(&self) -> IngredientAllowlist {
        self.regimens
            .values()
            .flat_map(|regimen| regimen.ingredients.iter())
            .collect()
    }

    /// Groups of regimen ids that share an identical ingredient set.
    ///
    /// Such regimens are kept distinct and each matches independently; this is
    /// informational only.
    pub fn shared_ingredient_sets(&self) -> Vec<Vec<RegimenId>> {
        let mut by_set: BTreeMap<&IngredientSet, Vec<RegimenId>> = BTreeMap::new();
        for regimen in self.regimens.values() {
            by_set.entry(&regimen.ingredients).or_default().push(regimen.id);
        }
        by_set.into_values().filter(|ids| ids.len() > 1).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_rows_into_regimens() {
        let catalog = RegimenCatalog::from_definitions(vec![
            RegimenDefinition::new(1, "X+Y", 10),
            RegimenDefinition::new(1, "X+Y", 20),
            RegimenDefinition::new(2, "Z-only", 30),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        let first = catalog.get(RegimenId::new(1)).unwrap();
        assert_eq!(first.ingredients.len(), 2);
        assert_eq!(catalog.ingredient_allowlist().len(), 3);
    }

    #[test]
    fn rejects_conflicting_names() {
        let error = RegimenCatalog::from_definitions(vec![
            RegimenDefinition::new(1, "X+Y", 10),
            RegimenDefinition::new(1, "Y+X", 20),
        ])
        .unwrap_err();
        assert_eq!(
            error,
            CatalogError::InconsistentName {
                regimen_id: RegimenId::new(1),
                first: "X+Y".to_string(),
                second: "Y+X".to_string(),
            }
        );
    }

    #[test]
    fn rejects_regimen_without_ingredients() {
        let error = RegimenCatalog::from_definitions(vec![RegimenDefinition {
            regimen_id: RegimenId::new(5),
            regimen_name: "Nothing".to_string(),
            ingredient_id: None,
        }])
        .unwrap_err();
        assert_eq!(
            error,
            CatalogError::EmptyRegimen {
                regimen_id: RegimenId::new(5)
            }
        );
    }

    #[test]
    fn rejects_blank_names() {
        let error =
            RegimenCatalog::from_definitions(vec![RegimenDefinition::new(3, "  ", 10)])
                .unwrap_err();
        assert!(matches!(error, CatalogError::BlankName { .. }));
    }

    #[test]
    fn reports_shared_ingredient_sets() {
        let catalog = RegimenCatalog::from_definitions(vec![
            RegimenDefinition::new(1, "A+B", 1),
            RegimenDefinition::new(1, "A+B", 2),
            RegimenDefinition::new(2, "B+A", 2),
            RegimenDefinition::new(2, "B+A", 1),
            RegimenDefinition::new(3, "A", 1),
        ])
        .unwrap();
        assert_eq!(
            catalog.shared_ingredient_sets(),
            vec![vec![RegimenId::new(1), RegimenId::new(2)]]
        );
    }
}
