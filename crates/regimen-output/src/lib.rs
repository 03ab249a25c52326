//! Persistence of regimen exposure results.
//!
//! Sinks implement [`ResultSink`]. File sinks never leave a partially written
//! target behind: rows go to a sibling temp file that is renamed over the
//! target once complete, and an existing target is only replaced when the
//! sink was built with `replace = true`.

mod atomic;
mod error;
mod intermediate;
mod options;
mod sink;

pub use error::{OutputError, Result};
pub use intermediate::{
    ensure_targets_available, intermediate_path, output_targets, write_intermediate_tables,
};
pub use options::OutputOptions;
pub use sink::{CsvSink, JsonSink, MemorySink, ResultSink, sink_for};
