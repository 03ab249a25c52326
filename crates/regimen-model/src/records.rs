//! Row types flowing through the pipeline.
//!
//! [`DrugExposure`] is the raw log entry, [`ExposureRecord`] its ingredient-level
//! resolution, [`Era`] and [`EraIngredient`] the intermediate tables, and
//! [`RegimenExposure`] the final output row.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{DrugConceptId, EraId, IngredientId, PersonId, RegimenId};

/// A drug-exposure log entry as recorded at the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugExposure {
    pub person_id: PersonId,
    pub drug_concept_id: DrugConceptId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Non-positive values are kept as recorded and ignored by
    /// [`DrugExposure::effective_end_date`].
    pub days_supply: Option<i64>,
}

impl DrugExposure {
    /// End date used for era construction.
    ///
    /// Falls back to `start + days_supply` and then to `start + 1 day` when the
    /// source omits an explicit end or records a supply of zero days or less.
    pub fn effective_end_date(&self) -> NaiveDate {
        if let Some(end) = self.end_date {
            return end;
        }
        let days = self
            .days_supply
            .and_then(|days| u64::try_from(days).ok())
            .filter(|days| *days > 0)
            .unwrap_or(1);
        self.start_date
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// An exposure of one person to one ingredient over `[start_date, end_date]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ExposureRecord {
    person_id: PersonId,
    ingredient_id: IngredientId,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl ExposureRecord {
    /// Builds a record, rejecting intervals that end before they start.
    pub fn new(
        person_id: PersonId,
        ingredient_id: IngredientId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        if end_date < start_date {
            return Err(ModelError::InvalidInterval {
                person_id,
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            person_id,
            ingredient_id,
            start_date,
            end_date,
        })
    }

    pub fn person_id(&self) -> PersonId {
        self.person_id
    }

    pub fn ingredient_id(&self) -> IngredientId {
        self.ingredient_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// A continuous, gap-tolerant span of any-ingredient exposure for one person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Era {
    pub era_id: EraId,
    pub person_id: PersonId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Era {
    /// Whether `date` falls inside the era, both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Membership of one ingredient in one era's ingredient set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EraIngredient {
    pub era_id: EraId,
    pub ingredient_id: IngredientId,
}

/// An era whose ingredient set exactly equals a regimen's definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegimenExposure {
    pub era_id: EraId,
    pub person_id: PersonId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub regimen_id: RegimenId,
    pub regimen_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn raw(end: Option<&str>, days_supply: Option<i64>) -> DrugExposure {
        DrugExposure {
            person_id: PersonId::new(1),
            drug_concept_id: DrugConceptId::new(100),
            start_date: date("2020-01-01"),
            end_date: end.map(date),
            days_supply,
        }
    }

    #[test]
    fn explicit_end_date_wins() {
        assert_eq!(
            raw(Some("2020-01-05"), Some(30)).effective_end_date(),
            date("2020-01-05")
        );
    }

    #[test]
    fn days_supply_extends_start() {
        assert_eq!(raw(None, Some(30)).effective_end_date(), date("2020-01-31"));
    }

    #[test]
    fn missing_supply_defaults_to_one_day() {
        assert_eq!(raw(None, None).effective_end_date(), date("2020-01-02"));
        assert_eq!(raw(None, Some(0)).effective_end_date(), date("2020-01-02"));
        assert_eq!(raw(None, Some(-1)).effective_end_date(), date("2020-01-02"));
    }

    #[test]
    fn rejects_inverted_interval() {
        let result = ExposureRecord::new(
            PersonId::new(1),
            IngredientId::new(10),
            date("2020-01-05"),
            date("2020-01-01"),
        );
        assert!(matches!(result, Err(ModelError::InvalidInterval { .. })));
    }

    #[test]
    fn era_window_is_inclusive() {
        let era = Era {
            era_id: EraId::new(1),
            person_id: PersonId::new(1),
            start_date: date("2020-01-01"),
            end_date: date("2020-01-10"),
        };
        assert!(era.contains(date("2020-01-01")));
        assert!(era.contains(date("2020-01-10")));
        assert!(!era.contains(date("2020-01-11")));
    }
}
