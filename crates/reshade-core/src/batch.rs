//! Batch runner: every (source, variant-index) pair becomes one blocking task.
//!
//! Sources are decoded and checked up front. Generation then fans out under a
//! semaphore sized `parallel_workers`, each task drawing from its own RNG seeded
//! by one master RNG in job order, so a seeded batch reproduces regardless of
//! scheduling. Progress goes out through a bounded channel as tasks finish.

use std::collections::{HashMap, HashSet};
use std::io::{Seek, Write};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::archive;
use crate::config::{BatchConfig, Config, LimitsConfig, VariantConfig};
use crate::error::{BatchError, PipelineError};
use crate::pipeline::channel::CancelToken;
use crate::pipeline::decode::{format_to_string, ImageDecoder, SourceImage, SourceInput};
use crate::pipeline::encode::random_file_name;
use crate::pipeline::processor::{ProcessOptions, VariantGenerator};
use crate::types::{BatchProgress, Variant, VariantRecord};

/// A source that contributed variants to the batch.
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub name: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// Perceptual hash of the source, when fingerprinting is enabled
    pub fingerprint: Option<String>,
    pub variants: usize,
}

/// A source that was dropped from the batch.
#[derive(Debug)]
pub struct SourceFailure {
    pub source_name: String,
    pub error: PipelineError,
}

/// Everything a finished batch produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Variants ordered by source, then variant index
    pub variants: Vec<Variant>,
    pub sources: Vec<SourceSummary>,
    pub failures: Vec<SourceFailure>,
}

impl BatchReport {
    /// Manifest records, one per variant.
    pub fn records(&self) -> Vec<VariantRecord> {
        let fingerprints: HashMap<&str, &str> = self
            .sources
            .iter()
            .filter_map(|s| s.fingerprint.as_deref().map(|f| (s.name.as_str(), f)))
            .collect();
        self.variants
            .iter()
            .map(|v| VariantRecord::new(v, fingerprints.get(v.source_name.as_str()).copied()))
            .collect()
    }

    /// Package every variant into one ZIP archive.
    pub fn write_archive<W: Write + Seek>(&self, writer: W) -> Result<W, BatchError> {
        archive::write_archive(writer, &self.variants)
    }

    /// Encoded bytes across all variants.
    pub fn total_bytes(&self) -> u64 {
        self.variants.iter().map(Variant::file_size).sum()
    }
}

enum JobOutcome {
    Finished {
        source_idx: usize,
        index: u32,
        result: Result<Variant, PipelineError>,
    },
    Skipped,
}

/// Runs the variant pipeline over a set of sources.
pub struct BatchRunner {
    variant: VariantConfig,
    batch: BatchConfig,
    limits: LimitsConfig,
    options: ProcessOptions,
}

impl BatchRunner {
    pub fn new(config: &Config) -> Self {
        Self::with_options(config, ProcessOptions::default())
    }

    pub fn with_options(config: &Config, options: ProcessOptions) -> Self {
        Self {
            variant: config.variant,
            batch: config.batch.clone(),
            limits: config.limits.clone(),
            options,
        }
    }

    /// Generate `variants_per_image` variants of every input.
    ///
    /// Validation failures (no inputs, variant count below one, out-of-range
    /// parameters, a crop that empties a source) return before any variant is
    /// generated. A source that fails to decode, or whose variant fails, is
    /// reported in [`BatchReport::failures`] and contributes no variants.
    pub async fn run(
        &self,
        inputs: Vec<SourceInput>,
        progress: Option<mpsc::Sender<BatchProgress>>,
        cancel: CancelToken,
    ) -> Result<BatchReport, BatchError> {
        if inputs.is_empty() {
            return Err(BatchError::NoSources);
        }
        let variants_per_image = self.batch.variants_per_image;
        if variants_per_image < 1 {
            return Err(BatchError::InvalidVariantCount(variants_per_image));
        }
        self.variant.validate()?;

        let start = std::time::Instant::now();
        let input_count = inputs.len();
        let workers = self.batch.parallel_workers.max(1);
        let generator = Arc::new(VariantGenerator::with_options(self.variant, &self.options));
        let semaphore = Arc::new(Semaphore::new(workers));

        let (sources, mut failures) = self.prepare(inputs, &generator, &semaphore).await?;
        if sources.is_empty() {
            return Err(BatchError::NoUsableSources(input_count));
        }

        let mut master = match self.batch.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let total = sources.len() * variants_per_image as usize;
        tracing::info!(
            "Generating {} variant(s) from {} source(s) with {} worker(s)",
            total,
            sources.len(),
            workers
        );

        let mut tasks = JoinSet::new();
        for (source_idx, source) in sources.iter().enumerate() {
            for index in 0..variants_per_image {
                let seed: u64 = master.gen();
                let source = Arc::clone(source);
                let generator = Arc::clone(&generator);
                let semaphore = Arc::clone(&semaphore);
                let cancel = cancel.clone();

                tasks.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return Ok(JobOutcome::Skipped);
                    };
                    if cancel.is_cancelled() {
                        return Ok(JobOutcome::Skipped);
                    }
                    tokio::task::spawn_blocking(move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        generator.generate(&source, index, &mut rng)
                    })
                    .await
                    .map(|result| JobOutcome::Finished {
                        source_idx,
                        index,
                        result,
                    })
                });
            }
        }

        let mut finished = Vec::with_capacity(total);
        let mut completed = 0usize;
        let mut skipped = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .and_then(|outcome| outcome)
                .map_err(|e| BatchError::Worker(e.to_string()))?;
            match outcome {
                JobOutcome::Skipped => {
                    skipped += 1;
                    continue;
                }
                JobOutcome::Finished {
                    source_idx,
                    index,
                    result,
                } => finished.push((source_idx, index, result)),
            }

            completed += 1;
            if let Some(tx) = &progress {
                if tx.send(BatchProgress { completed, total }).await.is_err() {
                    tracing::debug!("Progress receiver dropped");
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Batch cancelled after {}/{} variants", completed, total);
            return Err(BatchError::Cancelled { completed, total });
        }

        finished.sort_by_key(|(source_idx, index, _)| (*source_idx, *index));
        let mut produced: Vec<Vec<Variant>> = sources.iter().map(|_| Vec::new()).collect();
        let mut errors: Vec<Option<PipelineError>> = sources.iter().map(|_| None).collect();
        for (source_idx, _, result) in finished {
            match result {
                Ok(variant) => produced[source_idx].push(variant),
                Err(error) => {
                    errors[source_idx].get_or_insert(error);
                }
            }
        }

        let mut report = BatchReport {
            variants: Vec::with_capacity(total),
            ..BatchReport::default()
        };
        let mut names = HashSet::with_capacity(total);
        for ((source, variants), error) in sources.iter().zip(produced).zip(errors) {
            if let Some(error) = error {
                tracing::error!(
                    "Dropping {} variant(s) of {}: {}",
                    variants.len(),
                    source.name,
                    error
                );
                failures.push(SourceFailure {
                    source_name: source.name.clone(),
                    error,
                });
                continue;
            }

            report.sources.push(SourceSummary {
                name: source.name.clone(),
                format: format_to_string(source.format),
                width: source.width,
                height: source.height,
                fingerprint: source.fingerprint.clone(),
                variants: variants.len(),
            });
            for mut variant in variants {
                while !names.insert(variant.name.clone()) {
                    let renamed = random_file_name(&mut master);
                    tracing::debug!("Name collision on {}, renamed to {}", variant.name, renamed);
                    variant.name = renamed;
                }
                report.variants.push(variant);
            }
        }
        report.failures = failures;

        tracing::info!(
            "Generated {} variant(s), {} source(s) failed, in {:?}",
            report.variants.len(),
            report.failures.len(),
            start.elapsed()
        );
        Ok(report)
    }

    /// Decode and check every input, keeping input order.
    async fn prepare(
        &self,
        inputs: Vec<SourceInput>,
        generator: &Arc<VariantGenerator>,
        semaphore: &Arc<Semaphore>,
    ) -> Result<(Vec<Arc<SourceImage>>, Vec<SourceFailure>), BatchError> {
        let decoder = Arc::new(ImageDecoder::new(self.limits.clone()));
        let mut tasks = JoinSet::new();
        for (position, input) in inputs.into_iter().enumerate() {
            let decoder = Arc::clone(&decoder);
            let generator = Arc::clone(generator);
            let semaphore = Arc::clone(semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let name = input.name.clone();
                let prepared = tokio::task::spawn_blocking(move || {
                    prepare_source(&decoder, &generator, input)
                })
                .await;
                (position, name, prepared)
            });
        }

        let mut prepared = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (position, name, result) = joined.map_err(|e| BatchError::Worker(e.to_string()))?;
            match result.map_err(|e| BatchError::Worker(e.to_string()))? {
                Ok(source) => prepared.push((position, Arc::new(source))),
                Err(error) if error.is_configuration() => return Err(BatchError::Geometry(error)),
                Err(error) => {
                    tracing::warn!("Skipping {}: {}", name, error);
                    failures.push((position, SourceFailure { source_name: name, error }));
                }
            }
        }

        prepared.sort_by_key(|(position, _)| *position);
        failures.sort_by_key(|(position, _)| *position);
        Ok((
            prepared.into_iter().map(|(_, source)| source).collect(),
            failures.into_iter().map(|(_, failure)| failure).collect(),
        ))
    }
}

fn prepare_source(
    decoder: &ImageDecoder,
    generator: &VariantGenerator,
    input: SourceInput,
) -> Result<SourceImage, PipelineError> {
    let mut source = decoder.decode(input)?;
    generator
        .config()
        .check_geometry(&source.name, source.width, source.height)?;
    decoder.check_working_set(&source, generator.config())?;
    source.fingerprint = generator.fingerprint(&source);
    tracing::debug!(
        "Prepared {} ({}x{} {})",
        source.name,
        source.width,
        source.height,
        format_to_string(source.format)
    );
    Ok(source)
}
