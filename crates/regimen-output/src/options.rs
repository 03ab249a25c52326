use serde::{Deserialize, Serialize};

use regimen_model::OutputFormat;

/// How and whether results are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Overwrite an existing target; when false an existing target is an error.
    pub replace: bool,
    /// Run the pipeline but skip every write.
    pub dry_run: bool,
    /// Also write the era and era-ingredient tables next to the output.
    pub write_intermediate: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            replace: true,
            dry_run: false,
            write_intermediate: false,
        }
    }
}

impl OutputOptions {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_write_intermediate(mut self, write_intermediate: bool) -> Self {
        self.write_intermediate = write_intermediate;
        self
    }
}
