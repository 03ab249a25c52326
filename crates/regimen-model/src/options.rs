//! Configuration options for regimen exposure processing.

use serde::{Deserialize, Serialize};

/// Default gap tolerance in days between two exposures of the same era.
pub const DEFAULT_GAP_DAYS: u32 = 30;

/// Mode for processing person partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Process person partitions on the rayon thread pool.
    #[default]
    Parallel,
    /// Process person partitions one after another on the calling thread.
    Sequential,
}

/// Options controlling era construction and matching.
///
/// Passed explicitly into the pipeline entry point; nothing here is read from
/// the process environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Largest gap, in days, between one exposure's end and the next start
    /// for both to belong to the same era.
    pub gap_days: u32,

    /// How person partitions are scheduled. Output is identical in both modes.
    pub execution: ExecutionMode,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            gap_days: DEFAULT_GAP_DAYS,
            execution: ExecutionMode::default(),
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap_days(mut self, gap_days: u32) -> Self {
        self.gap_days = gap_days;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn sequential() -> Self {
        Self::default().with_execution(ExecutionMode::Sequential)
    }
}
