//! Ingredient resolution: rolling raw drug concepts up to ingredients.
//!
//! A single raw drug may roll up to several ingredients (combination
//! products), and only ingredients on the catalog allowlist are kept.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, info};

use regimen_model::{DrugConceptId, DrugExposure, ExposureRecord, IngredientAllowlist, IngredientId};

use crate::csv_table::read_csv_table;
use crate::error::Result;
use crate::values::RowReader;

pub const ANCESTOR_CONCEPT_ID: &str = "ancestor_concept_id";
pub const DESCENDANT_CONCEPT_ID: &str = "descendant_concept_id";

/// Maps a raw drug exposure to ingredient-level exposures.
pub trait IngredientResolver: Send + Sync {
    /// Candidate ingredients for a raw drug concept, before allowlist filtering.
    fn ingredients_for(&self, drug: DrugConceptId) -> Vec<IngredientId>;

    /// Short name for logging.
    fn resolver_name(&self) -> &str;

    /// Resolves one raw exposure, keeping only allowlisted ingredients.
    ///
    /// Every produced record spans the raw exposure's start to its effective
    /// (possibly defaulted) end date.
    fn resolve(
        &self,
        exposure: &DrugExposure,
        allowlist: &IngredientAllowlist,
    ) -> Result<Vec<ExposureRecord>> {
        let end_date = exposure.effective_end_date();
        let ingredients: BTreeSet<IngredientId> = self
            .ingredients_for(exposure.drug_concept_id)
            .into_iter()
            .filter(|ingredient| allowlist.contains(*ingredient))
            .collect();
        let mut records = Vec::with_capacity(ingredients.len());
        for ingredient in ingredients {
            records.push(ExposureRecord::new(
                exposure.person_id,
                ingredient,
                exposure.start_date,
                end_date,
            )?);
        }
        Ok(records)
    }
}

/// Treats every raw drug concept as already being an ingredient.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl IngredientResolver for IdentityResolver {
    fn ingredients_for(&self, drug: DrugConceptId) -> Vec<IngredientId> {
        vec![IngredientId::from(drug)]
    }

    fn resolver_name(&self) -> &str {
        "identity"
    }
}

/// Resolves drugs through a concept-ancestor hierarchy.
///
/// A drug resolves to each of its ancestors and to itself, so ingredient
/// concepts recorded directly in the log resolve without a self-ancestry row.
#[derive(Debug, Clone, Default)]
pub struct AncestorResolver {
    ancestors: BTreeMap<DrugConceptId, BTreeSet<IngredientId>>,
}

impl AncestorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `descendant` rolls up to `ancestor`.
    pub fn add_relationship(&mut self, ancestor: IngredientId, descendant: DrugConceptId) {
        self.ancestors.entry(descendant).or_default().insert(ancestor);
    }

    pub fn with_relationship(mut self, ancestor: i64, descendant: i64) -> Self {
        self.add_relationship(IngredientId::new(ancestor), DrugConceptId::new(descendant));
        self
    }

    pub fn descendant_count(&self) -> usize {
        self.ancestors.len()
    }
}

impl FromIterator<(IngredientId, DrugConceptId)> for AncestorResolver {
    fn from_iter<I: IntoIterator<Item = (IngredientId, DrugConceptId)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (ancestor, descendant) in iter {
            resolver.add_relationship(ancestor, descendant);
        }
        resolver
    }
}

impl IngredientResolver for AncestorResolver {
    fn ingredients_for(&self, drug: DrugConceptId) -> Vec<IngredientId> {
        let mut ingredients: BTreeSet<IngredientId> =
            self.ancestors.get(&drug).cloned().unwrap_or_default();
        ingredients.insert(IngredientId::from(drug));
        ingredients.into_iter().collect()
    }

    fn resolver_name(&self) -> &str {
        "concept_ancestor"
    }
}

/// Loads an [`AncestorResolver`] from an `ancestor_concept_id, descendant_concept_id` table.
pub fn read_concept_ancestors(path: &Path) -> Result<AncestorResolver> {
    let table = read_csv_table(path)?;
    let ancestor_col = table.require_column(ANCESTOR_CONCEPT_ID)?;
    let descendant_col = table.require_column(DESCENDANT_CONCEPT_ID)?;
    let mut resolver = AncestorResolver::new();
    for index in 0..table.len() {
        let row = RowReader::new(&table, index);
        resolver.add_relationship(
            row.required(ancestor_col, ANCESTOR_CONCEPT_ID)?,
            row.required(descendant_col, DESCENDANT_CONCEPT_ID)?,
        );
    }
    debug!(
        path = %path.display(),
        descendant_count = resolver.descendant_count(),
        "read concept ancestors"
    );
    Ok(resolver)
}

/// Output of the resolution stage.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Distinct ingredient-level records, sorted.
    pub records: Vec<ExposureRecord>,
    pub raw_count: usize,
    /// Raw exposures that produced no allowlisted ingredient.
    pub excluded_count: usize,
    /// Resolved records dropped as exact duplicates of another record.
    pub duplicate_count: usize,
}

/// Resolves every raw exposure and removes exact duplicate records.
pub fn resolve_exposures(
    exposures: &[DrugExposure],
    resolver: &dyn IngredientResolver,
    allowlist: &IngredientAllowlist,
) -> Result<Resolution> {
    let mut records = Vec::with_capacity(exposures.len());
    let mut excluded_count = 0usize;
    for exposure in exposures {
        let resolved = resolver.resolve(exposure, allowlist)?;
        if resolved.is_empty() {
            excluded_count += 1;
        }
        records.extend(resolved);
    }
    let before_dedupe = records.len();
    records.sort_unstable();
    records.dedup();
    let resolution = Resolution {
        duplicate_count: before_dedupe - records.len(),
        records,
        raw_count: exposures.len(),
        excluded_count,
    };
    info!(
        resolver = resolver.resolver_name(),
        raw_count = resolution.raw_count,
        resolved_count = resolution.records.len(),
        excluded_count = resolution.excluded_count,
        duplicate_count = resolution.duplicate_count,
        "ingredient resolution complete"
    );
    Ok(resolution)
}
