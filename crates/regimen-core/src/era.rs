//! Era construction: gap-tolerant interval collapsing per person.
//!
//! Each exposure interval is extended ("padded") by the gap tolerance. Walking
//! the intervals in start order, a start that falls on or before the current
//! padded reach joins the open era; otherwise the open era closes at its reach
//! minus the pad and a new era opens. Starts therefore order before padded ends
//! on the same day, so a gap exactly equal to the tolerance merges.
//!
//! Ingredient identity is ignored at this stage.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, info_span};

use regimen_model::{Era, EraId, ExposureRecord, PersonId, PipelineOptions};

use crate::partition::{PersonPartitions, map_partitions, partition_person};

/// A closed `[start, end]` date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Interval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Open era during the sweep.
///
/// `last_end` is the furthest unpadded end seen so far; the padded reach is
/// `last_end + gap_days`, kept implicit to avoid date overflow near the
/// calendar limits.
struct OpenEra {
    start: NaiveDate,
    last_end: NaiveDate,
}

impl OpenEra {
    fn reaches(&self, start: NaiveDate, gap_days: i64) -> bool {
        start.signed_duration_since(self.last_end).num_days() <= gap_days
    }

    fn close(self) -> Interval {
        debug_assert!(
            self.last_end >= self.start,
            "era end {} precedes era start {}",
            self.last_end,
            self.start
        );
        Interval::new(self.start, self.last_end)
    }
}

/// Collapses intervals whose gaps are at most `gap_days` into maximal spans.
///
/// Input order does not matter. Nested, overlapping, touching, and
/// within-tolerance intervals are absorbed into a single span; the result is
/// sorted and pairwise separated by more than `gap_days`.
pub fn collapse_intervals(mut intervals: Vec<Interval>, gap_days: u32) -> Vec<Interval> {
    intervals.sort_unstable();
    let gap_days = i64::from(gap_days);
    let mut collapsed = Vec::new();
    let mut iter = intervals.into_iter();
    let Some(first) = iter.next() else {
        return collapsed;
    };
    let mut open = OpenEra {
        start: first.start,
        last_end: first.end,
    };
    for interval in iter {
        if open.reaches(interval.start, gap_days) {
            open.last_end = open.last_end.max(interval.end);
        } else {
            collapsed.push(open.close());
            open = OpenEra {
                start: interval.start,
                last_end: interval.end,
            };
        }
    }
    collapsed.push(open.close());
    collapsed
}

/// Eras of one person, without ids.
fn person_eras(records: &[ExposureRecord], gap_days: u32) -> Vec<(PersonId, Interval)> {
    let Some(person_id) = partition_person(records) else {
        return Vec::new();
    };
    let intervals = records
        .iter()
        .map(|record| Interval::new(record.start_date(), record.end_date()))
        .collect();
    collapse_intervals(intervals, gap_days)
        .into_iter()
        .map(|interval| (person_id, interval))
        .collect()
}

/// Builds eras for every person and assigns dense ids.
///
/// Ids start at 1 and follow `(person_id, start_date)` order, so they depend
/// only on the input set and not on partition scheduling.
pub fn build_eras(records: &[ExposureRecord], options: &PipelineOptions) -> Vec<Era> {
    let span = info_span!("build_eras", gap_days = options.gap_days);
    let _guard = span.enter();
    let start = Instant::now();

    let partitions = PersonPartitions::new(records);
    let slices = partitions.slices();
    let per_person = map_partitions(&slices, options.execution, |slice| {
        person_eras(slice, options.gap_days)
    });

    let mut spans: Vec<(PersonId, Interval)> = per_person.into_iter().flatten().collect();
    spans.sort_unstable();
    let eras: Vec<Era> = spans
        .into_iter()
        .enumerate()
        .map(|(index, (person_id, interval))| Era {
            era_id: EraId::new(index as i64 + 1),
            person_id,
            start_date: interval.start,
            end_date: interval.end,
        })
        .collect();

    debug!(
        absorbed = records.len().saturating_sub(eras.len()),
        "intervals absorbed into eras"
    );
    info!(
        person_count = slices.len(),
        exposure_count = records.len(),
        era_count = eras.len(),
        duration_ms = start.elapsed().as_millis(),
        "era construction complete"
    );
    eras
}
