//! Generate setup: config overrides and source gathering.

use std::path::PathBuf;

use reshade_core::{Config, FileDiscovery, SourceInput, Validator};

use super::GenerateArgs;

/// Sources read from disk, plus the files rejected before decoding.
#[derive(Debug, Default)]
pub struct GatheredSources {
    pub inputs: Vec<SourceInput>,
    pub rejected: usize,
}

/// Apply CLI overrides to the loaded config and validate the result.
pub fn setup_config(args: &GenerateArgs, mut config: Config) -> anyhow::Result<Config> {
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(variants) = args.variants {
        config.batch.variants_per_image = variants;
    }
    if let Some(brightness) = args.brightness {
        config.variant.brightness = brightness;
    }
    if let Some(contrast) = args.contrast {
        config.variant.contrast = contrast;
    }
    if let Some(crop) = args.crop {
        config.variant.crop = crop;
    }
    if let Some(border) = args.border {
        config.variant.border = border;
    }
    if args.no_noise {
        config.variant.noise = false;
    }
    if args.no_color_shift {
        config.variant.color_shift = false;
    }
    if args.no_metadata {
        config.variant.randomize_metadata = false;
    }
    if args.seed.is_some() {
        config.batch.seed = args.seed;
    }
    if let Some(parallel) = args.parallel {
        config.batch.parallel_workers = parallel;
    }
}

/// Expand inputs into validated, in-memory sources.
///
/// Files that fail validation or cannot be read are skipped with a warning.
pub fn gather_inputs(paths: &[PathBuf], config: &Config) -> anyhow::Result<GatheredSources> {
    for path in paths {
        if !path.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                path
            );
        }
    }

    let files = FileDiscovery::new(&config.batch).discover_all(paths);
    if files.is_empty() {
        anyhow::bail!(
            "No supported image files found in {} input(s).\n\n  Supported formats: {}",
            paths.len(),
            config.batch.supported_formats.join(", ")
        );
    }
    tracing::debug!(
        "Discovered {} file(s), {} bytes",
        files.len(),
        FileDiscovery::total_size(&files)
    );

    let validator = Validator::new(config.limits.clone());
    let mut sources = GatheredSources::default();
    for file in &files {
        match validator.validate(&file.path) {
            Ok(signature) => tracing::trace!("{:?} looks like {}", file.path, signature.as_str()),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", file.path, e);
                sources.rejected += 1;
                continue;
            }
        }
        match SourceInput::read(&file.path) {
            Ok(input) => sources.inputs.push(input),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", file.path, e);
                sources.rejected += 1;
            }
        }
    }

    if sources.inputs.is_empty() {
        anyhow::bail!("None of the {} discovered file(s) passed validation", files.len());
    }
    Ok(sources)
}
