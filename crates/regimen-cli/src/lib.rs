//! Library components of the `regimen-finder` command.

pub mod logging;
pub mod pipeline;
pub mod types;
