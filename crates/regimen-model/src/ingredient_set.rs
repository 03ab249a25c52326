//! Canonical ingredient sets and the comparison rule used for regimen matching.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::IngredientId;

/// A sorted, duplicate-free set of ingredients.
///
/// Two sets built from the same members in any order compare and hash equal,
/// which lets a set be used directly as a lookup key.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientSet(BTreeSet<IngredientId>);

impl IngredientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ingredient, returning `false` when it was already present.
    pub fn insert(&mut self, ingredient: IngredientId) -> bool {
        self.0.insert(ingredient)
    }

    pub fn contains(&self, ingredient: IngredientId) -> bool {
        self.0.contains(&ingredient)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IngredientId> + '_ {
        self.0.iter().copied()
    }

    /// Counts shared members and sizes of both sides.
    pub fn compare(&self, other: &IngredientSet) -> SetComparison {
        SetComparison {
            match_count: self.0.intersection(&other.0).count(),
            left_size: self.len(),
            right_size: other.len(),
        }
    }
}

impl FromIterator<IngredientId> for IngredientSet {
    fn from_iter<I: IntoIterator<Item = IngredientId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<IngredientId> for IngredientSet {
    fn extend<I: IntoIterator<Item = IngredientId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Result of comparing an era's ingredient set (left) against a regimen's (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetComparison {
    /// Ingredients present on both sides.
    pub match_count: usize,
    pub left_size: usize,
    pub right_size: usize,
}

impl SetComparison {
    /// Exact equality: every regimen ingredient is present and the era has nothing else.
    pub fn is_exact(self) -> bool {
        self.match_count == self.right_size && self.left_size == self.right_size
    }
}

/// Ingredients referenced by at least one regimen.
///
/// Exposures to anything outside the allowlist never reach era construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAllowlist(BTreeSet<IngredientId>);

impl IngredientAllowlist {
    pub fn contains(&self, ingredient: IngredientId) -> bool {
        self.0.contains(&ingredient)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IngredientId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<IngredientId> for IngredientAllowlist {
    fn from_iter<I: IntoIterator<Item = IngredientId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> IngredientSet {
        ids.iter().copied().map(IngredientId::new).collect()
    }

    #[test]
    fn order_and_duplicates_do_not_matter() {
        assert_eq!(set(&[3, 1, 2, 1]), set(&[1, 2, 3]));
        assert_eq!(set(&[3, 1, 2, 1]).len(), 3);
    }

    #[test]
    fn exact_comparison_is_symmetric() {
        let era = set(&[1, 2, 3]);
        assert!(era.compare(&set(&[3, 2, 1])).is_exact());
        assert!(!era.compare(&set(&[1, 2])).is_exact());
        assert!(!era.compare(&set(&[1, 2, 3, 4])).is_exact());
        assert!(!era.compare(&set(&[4, 5, 6])).is_exact());
    }

    #[test]
    fn empty_sets_compare_exact() {
        assert!(set(&[]).compare(&set(&[])).is_exact());
    }
}
