//! Person-level partitioning and partition scheduling.
//!
//! Every core stage is independent across persons, so work is split into
//! per-person slices and mapped either on the rayon pool or sequentially. The
//! two modes return results in the same order.

use rayon::prelude::*;

use regimen_model::{Era, ExecutionMode, ExposureRecord, PersonId};

/// Exposure records sorted by person, viewable as per-person slices.
#[derive(Debug, Clone, Default)]
pub struct PersonPartitions {
    records: Vec<ExposureRecord>,
}

impl PersonPartitions {
    pub fn new(records: &[ExposureRecord]) -> Self {
        let mut records = records.to_vec();
        records.sort_unstable();
        Self { records }
    }

    /// One slice per person, in ascending person order.
    pub fn slices(&self) -> Vec<&[ExposureRecord]> {
        self.records
            .chunk_by(|left, right| left.person_id() == right.person_id())
            .collect()
    }

    pub fn person_count(&self) -> usize {
        self.slices().len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Person of a non-empty partition slice.
pub(crate) fn partition_person(slice: &[ExposureRecord]) -> Option<PersonId> {
    slice.first().map(ExposureRecord::person_id)
}

/// Groups eras (already sorted by person) into per-person slices.
pub(crate) fn eras_by_person(eras: &[Era]) -> Vec<&[Era]> {
    eras.chunk_by(|left, right| left.person_id == right.person_id)
        .collect()
}

/// Maps `f` over `items` in the requested mode, preserving input order.
pub(crate) fn map_partitions<T, R, F>(items: &[T], mode: ExecutionMode, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match mode {
        ExecutionMode::Parallel => items.par_iter().map(f).collect(),
        ExecutionMode::Sequential => items.iter().map(f).collect(),
    }
}
