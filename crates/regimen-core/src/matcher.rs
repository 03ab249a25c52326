//! Exact regimen matching.
//!
//! An era matches a regimen only when its ingredient set equals the regimen's
//! ingredient set: a superset (era with an extra drug) or a subset (era missing
//! a drug) does not match. Regimens that share a set each produce their own row.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, info_span};

use regimen_model::{
    Era, EraIngredient, IngredientSet, PipelineOptions, Regimen, RegimenCatalog, RegimenExposure,
};

use crate::aggregate::EraIngredientSets;
use crate::partition::map_partitions;

/// Catalog regimens keyed by their ingredient set.
///
/// Lookup by set is equivalent to the pairwise counting rule in
/// [`matches_by_comparison`]: equal sets are exactly those where the shared
/// count equals both sizes.
#[derive(Debug)]
pub struct RegimenIndex<'a> {
    by_set: HashMap<&'a IngredientSet, Vec<&'a Regimen>>,
}

impl<'a> RegimenIndex<'a> {
    pub fn new(catalog: &'a RegimenCatalog) -> Self {
        let mut by_set: HashMap<&'a IngredientSet, Vec<&'a Regimen>> = HashMap::new();
        for regimen in catalog.regimens() {
            by_set.entry(&regimen.ingredients).or_default().push(regimen);
        }
        Self { by_set }
    }

    /// Regimens whose definition equals `set`, in ascending regimen id order.
    pub fn matches(&self, set: &IngredientSet) -> &[&'a Regimen] {
        self.by_set.get(set).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct ingredient sets in the catalog.
    pub fn set_count(&self) -> usize {
        self.by_set.len()
    }
}

/// Regimens matching `set` under the pairwise counting rule.
///
/// Scans the whole catalog; used to cross-check [`RegimenIndex`].
pub fn matches_by_comparison<'a>(set: &IngredientSet, catalog: &'a RegimenCatalog) -> Vec<&'a Regimen> {
    catalog
        .regimens()
        .filter(|regimen| set.compare(&regimen.ingredients).is_exact())
        .collect()
}

/// Emits one row per `(era, regimen)` pair whose sets are equal.
///
/// Rows are sorted by era id then regimen id. Eras without any ingredient rows
/// cannot match, since every catalog regimen is non-empty.
pub fn match_regimens(
    eras: &[Era],
    era_ingredients: &[EraIngredient],
    catalog: &RegimenCatalog,
    options: &PipelineOptions,
) -> Vec<RegimenExposure> {
    let span = info_span!("match_regimens", regimen_count = catalog.len());
    let _guard = span.enter();
    let start = Instant::now();

    let index = RegimenIndex::new(catalog);
    let sets = EraIngredientSets::from_rows(era_ingredients);
    let per_era = map_partitions(eras, options.execution, |era| {
        let Some(set) = sets.get(era.era_id) else {
            return Vec::new();
        };
        index
            .matches(set)
            .iter()
            .map(|regimen| {
                debug_assert!(set.compare(&regimen.ingredients).is_exact());
                RegimenExposure {
                    era_id: era.era_id,
                    person_id: era.person_id,
                    start_date: era.start_date,
                    end_date: era.end_date,
                    regimen_id: regimen.id,
                    regimen_name: regimen.name.clone(),
                }
            })
            .collect::<Vec<_>>()
    });

    let mut rows: Vec<RegimenExposure> = per_era.into_iter().flatten().collect();
    rows.sort_unstable_by_key(|row| (row.era_id, row.regimen_id));
    debug!(distinct_sets = index.set_count(), "regimen index built");
    info!(
        era_count = eras.len(),
        regimen_exposure_count = rows.len(),
        duration_ms = start.elapsed().as_millis(),
        "regimen matching complete"
    );
    rows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use regimen_model::{EraId, IngredientId, PersonId, RegimenDefinition, RegimenId};

    use super::*;

    fn catalog(rows: &[(i64, &str, i64)]) -> RegimenCatalog {
        RegimenCatalog::from_definitions(
            rows.iter()
                .map(|(id, name, ingredient)| RegimenDefinition::new(*id, *name, *ingredient)),
        )
        .unwrap()
    }

    fn era(id: i64) -> Era {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        Era {
            era_id: EraId::new(id),
            person_id: PersonId::new(1),
            start_date: day,
            end_date: day,
        }
    }

    fn members(era: i64, ingredients: &[i64]) -> Vec<EraIngredient> {
        ingredients
            .iter()
            .map(|id| EraIngredient {
                era_id: EraId::new(era),
                ingredient_id: IngredientId::new(*id),
            })
            .collect()
    }

    fn set(ids: &[i64]) -> IngredientSet {
        ids.iter().copied().map(IngredientId::new).collect()
    }

    #[test]
    fn superset_and_subset_do_not_match() {
        let catalog = catalog(&[(1, "A+B", 10), (1, "A+B", 20)]);
        let eras = vec![era(1), era(2), era(3)];
        let mut rows = members(1, &[10, 20]);
        rows.extend(members(2, &[10, 20, 30]));
        rows.extend(members(3, &[10]));
        let matched = match_regimens(&eras, &rows, &catalog, &PipelineOptions::sequential());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].era_id, EraId::new(1));
    }

    #[test]
    fn shared_sets_match_independently() {
        let catalog = catalog(&[(1, "A+B", 10), (1, "A+B", 20), (2, "B+A", 20), (2, "B+A", 10)]);
        let matched = match_regimens(
            &[era(1)],
            &members(1, &[10, 20]),
            &catalog,
            &PipelineOptions::default(),
        );
        let ids: Vec<RegimenId> = matched.iter().map(|row| row.regimen_id).collect();
        assert_eq!(ids, vec![RegimenId::new(1), RegimenId::new(2)]);
    }

    #[test]
    fn era_without_ingredients_never_matches() {
        let catalog = catalog(&[(1, "A", 10)]);
        assert!(match_regimens(&[era(1)], &[], &catalog, &PipelineOptions::default()).is_empty());
    }

    #[test]
    fn index_agrees_with_pairwise_comparison() {
        let catalog = catalog(&[(1, "A", 10), (2, "A+B", 10), (2, "A+B", 20), (3, "B", 20)]);
        let index = RegimenIndex::new(&catalog);
        for candidate in [set(&[10]), set(&[20]), set(&[10, 20]), set(&[10, 20, 30]), set(&[])] {
            let indexed: Vec<RegimenId> = index.matches(&candidate).iter().map(|r| r.id).collect();
            let scanned: Vec<RegimenId> = matches_by_comparison(&candidate, &catalog)
                .iter()
                .map(|r| r.id)
                .collect();
            assert_eq!(indexed, scanned);
        }
        assert_eq!(index.set_count(), 3);
    }
}
