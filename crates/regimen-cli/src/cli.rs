//! CLI argument definitions for the regimen exposure finder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use regimen_model::DEFAULT_GAP_DAYS;

#[derive(Parser)]
#[command(
    name = "regimen-finder",
    version,
    about = "Find eras whose drug ingredients exactly match a catalog regimen",
    long_about = "Collapse each person's drug exposures into gap-tolerant eras and report\n\
                  every era whose ingredient set equals a regimen definition.\n\n\
                  Supersets and subsets of a regimen do not match."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow person identifiers in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build eras and match them against the regimen catalog.
    Run(RunArgs),

    /// Validate a regimen catalog and list its regimens.
    Catalog(CatalogArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Drug exposure log (CSV).
    #[arg(long = "exposures", value_name = "CSV")]
    pub exposures: PathBuf,

    /// Regimen catalog (CSV: regimen_id, regimen_name, ingredient_id).
    #[arg(long = "catalog", value_name = "CSV")]
    pub catalog: PathBuf,

    /// Concept ancestor table rolling drugs up to ingredients.
    #[arg(long = "ancestors", value_name = "CSV")]
    pub ancestors: Option<PathBuf>,

    /// Output file (default: regimen_exposure.<format> beside the exposure log).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormatArg,

    /// Maximum gap in days between exposures of one era.
    #[arg(long = "gap-days", value_name = "DAYS", default_value_t = DEFAULT_GAP_DAYS)]
    pub gap_days: u32,

    /// Fail instead of replacing an existing output file.
    #[arg(long = "no-replace")]
    pub no_replace: bool,

    /// Run the pipeline and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Process persons one at a time instead of on the thread pool.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Also write the era and era-ingredient tables.
    #[arg(long = "write-intermediate")]
    pub write_intermediate: bool,
}

#[derive(Parser)]
pub struct CatalogArgs {
    /// Regimen catalog (CSV: regimen_id, regimen_name, ingredient_id).
    #[arg(long = "catalog", value_name = "CSV")]
    pub catalog: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
