//! Era-ingredient aggregation.
//!
//! An exposure contributes its ingredient to the era whose inclusive window
//! contains the exposure's start date. Only the start is tested; an exposure
//! that runs past the era end still counts. This is the same windowing the era
//! builder uses, so every exposure lands in exactly one era of its person.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::{debug, info, info_span};

use regimen_model::{Era, EraId, EraIngredient, ExposureRecord, IngredientSet, PersonId, PipelineOptions};

use crate::partition::{PersonPartitions, eras_by_person, map_partitions, partition_person};

/// Ingredient set of each era, keyed by era id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EraIngredientSets {
    sets: BTreeMap<EraId, IngredientSet>,
}

impl EraIngredientSets {
    /// Groups `{era_id, ingredient_id}` rows into per-era sets.
    pub fn from_rows(rows: &[EraIngredient]) -> Self {
        let mut sets: BTreeMap<EraId, IngredientSet> = BTreeMap::new();
        for row in rows {
            sets.entry(row.era_id).or_default().insert(row.ingredient_id);
        }
        Self { sets }
    }

    pub fn get(&self, era_id: EraId) -> Option<&IngredientSet> {
        self.sets.get(&era_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EraId, &IngredientSet)> {
        self.sets.iter().map(|(id, set)| (*id, set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Flattens back into sorted `{era_id, ingredient_id}` rows.
    pub fn to_rows(&self) -> Vec<EraIngredient> {
        self.sets
            .iter()
            .flat_map(|(era_id, set)| {
                set.iter().map(move |ingredient_id| EraIngredient {
                    era_id: *era_id,
                    ingredient_id,
                })
            })
            .collect()
    }
}

/// Era whose window contains `record`'s start, found by binary search.
///
/// `eras` must belong to one person and be sorted by start; eras of one person
/// never overlap, so at most one candidate exists.
fn containing_era(eras: &[Era], record: &ExposureRecord) -> Option<EraId> {
    let start = record.start_date();
    let after = eras.partition_point(|era| era.start_date <= start);
    let candidate = eras.get(after.checked_sub(1)?)?;
    candidate.contains(start).then_some(candidate.era_id)
}

fn person_sets(eras: &[Era], records: &[ExposureRecord]) -> (Vec<(EraId, IngredientSet)>, usize) {
    let mut sets: BTreeMap<EraId, IngredientSet> = BTreeMap::new();
    let mut unassigned = 0usize;
    for record in records {
        match containing_era(eras, record) {
            Some(era_id) => {
                sets.entry(era_id).or_default().insert(record.ingredient_id());
            }
            None => unassigned += 1,
        }
    }
    (sets.into_iter().collect(), unassigned)
}

/// Computes the distinct ingredients exposed during each era.
///
/// Returns `{era_id, ingredient_id}` rows sorted by era then ingredient, one
/// row per distinct pair regardless of how many exposures contributed it.
pub fn aggregate_era_ingredients(
    eras: &[Era],
    records: &[ExposureRecord],
    options: &PipelineOptions,
) -> Vec<EraIngredient> {
    let span = info_span!("aggregate_era_ingredients");
    let _guard = span.enter();
    let start = Instant::now();

    let mut sorted_eras = eras.to_vec();
    sorted_eras.sort_unstable_by_key(|era| (era.person_id, era.start_date));
    let eras_for: HashMap<PersonId, &[Era]> = eras_by_person(&sorted_eras)
        .into_iter()
        .filter_map(|slice| slice.first().map(|era| (era.person_id, slice)))
        .collect();

    let partitions = PersonPartitions::new(records);
    let slices = partitions.slices();
    let per_person = map_partitions(&slices, options.execution, |slice| {
        let eras = partition_person(slice)
            .and_then(|person| eras_for.get(&person).copied())
            .unwrap_or(&[]);
        person_sets(eras, slice)
    });

    let mut sets = EraIngredientSets::default();
    let mut unassigned = 0usize;
    for (person_sets, person_unassigned) in per_person {
        unassigned += person_unassigned;
        sets.sets.extend(person_sets);
    }
    if unassigned > 0 {
        debug!(unassigned, "exposures outside every era window were skipped");
    }
    let rows = sets.to_rows();
    info!(
        era_count = sets.len(),
        era_ingredient_count = rows.len(),
        duration_ms = start.elapsed().as_millis(),
        "era ingredient aggregation complete"
    );
    rows
}
