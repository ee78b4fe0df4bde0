//! The `reshade generate` command for producing image variants.

mod batch;
mod setup;
pub mod types;

pub use types::ManifestFormat;

use clap::Args;
use reshade_core::Config;
use std::path::PathBuf;

use batch::{run_batch, ManifestTarget};
use setup::{gather_inputs, setup_config};

/// Arguments for the `generate` command.
///
/// Unset options fall back to the config file.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Image files or directories to generate variants from
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Variants per source image
    #[arg(short = 'n', long)]
    pub variants: Option<u32>,

    /// Brightness in percent (50-200)
    #[arg(long)]
    pub brightness: Option<u32>,

    /// Contrast in percent (50-200)
    #[arg(long)]
    pub contrast: Option<u32>,

    /// Fraction trimmed from each side (0.0-0.20)
    #[arg(long)]
    pub crop: Option<f64>,

    /// Border width in pixels
    #[arg(long)]
    pub border: Option<u32>,

    /// Disable per-pixel noise
    #[arg(long)]
    pub no_noise: bool,

    /// Disable per-channel color shift
    #[arg(long)]
    pub no_color_shift: bool,

    /// Only randomize Software, Artist and ImageDescription
    #[arg(long)]
    pub no_metadata: bool,

    /// Seed for reproducible output
    #[arg(long, env = "RESHADE_SEED")]
    pub seed: Option<u64>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Output archive (defaults to output.dir/output.archive_name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a manifest of the generated variants to this file
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Manifest format (defaults to output.manifest_format)
    #[arg(long, value_enum)]
    pub manifest_format: Option<ManifestFormat>,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let config = setup_config(&args, config)?;
    let sources = gather_inputs(&args.inputs, &config)?;
    tracing::info!(
        "Loaded {} source image(s), {} variant(s) each",
        sources.inputs.len(),
        config.batch.variants_per_image
    );

    let archive_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.archive_path());
    let manifest = args.manifest.clone().map(|path| ManifestTarget {
        path,
        format: args
            .manifest_format
            .map(ManifestFormat::to_core)
            .or_else(|| reshade_core::OutputFormat::parse(&config.output.manifest_format))
            .unwrap_or(reshade_core::OutputFormat::Json),
    });

    run_batch(&config, sources, &archive_path, manifest).await
}
