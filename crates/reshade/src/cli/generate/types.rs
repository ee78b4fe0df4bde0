//! CLI enum types for the generate command.

use clap::ValueEnum;
use reshade_core::OutputFormat as CoreOutputFormat;

/// Supported manifest formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ManifestFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl ManifestFormat {
    pub fn to_core(self) -> CoreOutputFormat {
        match self {
            ManifestFormat::Json => CoreOutputFormat::Json,
            ManifestFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_core().as_str())
    }
}
