//! Batch execution: progress display, Ctrl-C cancellation, archive and manifest output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use reshade_core::{
    progress_channel, write_manifest, BatchReport, BatchRunner, CancelToken, Config,
    OutputFormat, ProcessOptions,
};

use super::setup::GatheredSources;

/// Where and how to write the manifest.
#[derive(Debug, Clone)]
pub struct ManifestTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

/// Run the batch and write its outputs.
pub async fn run_batch(
    config: &Config,
    sources: GatheredSources,
    archive_path: &Path,
    manifest: Option<ManifestTarget>,
) -> anyhow::Result<()> {
    let total = sources.inputs.len() as u64 * u64::from(config.batch.variants_per_image);
    let progress = create_progress_bar(total);
    let (tx, mut rx) = progress_channel(&config.batch);
    let (cancel_handle, cancel) = CancelToken::pair();
    let start_time = Instant::now();

    let bar = progress.clone();
    let display = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            bar.set_length(update.total as u64);
            bar.set_position(update.completed as u64);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                bar.set_message(format!("{:.1} variants/sec", update.completed as f64 / elapsed));
            }
        }
    });

    let options = ProcessOptions {
        fingerprint: manifest.is_some(),
    };
    let runner = BatchRunner::with_options(config, options);
    let run = runner.run(sources.inputs, Some(tx), cancel);
    tokio::pin!(run);

    let result = tokio::select! {
        result = &mut run => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, cancelling batch");
            progress.set_message("cancelling...");
            cancel_handle.cancel();
            run.await
        }
    };
    if let Err(e) = display.await {
        tracing::debug!("Progress display task ended abnormally: {e}");
    }
    progress.finish_and_clear();

    let report = result?;
    if report.variants.is_empty() {
        anyhow::bail!(
            "No variants were generated: all {} source(s) failed",
            report.failures.len()
        );
    }

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(archive_path)?;
    let mut writer = report.write_archive(BufWriter::new(file))?;
    writer.flush()?;
    tracing::info!("Archive written to {:?}", archive_path);

    if let Some(target) = &manifest {
        write_manifest(&target.path, target.format, &report.records())?;
    }

    print_summary(
        &report,
        sources.rejected,
        archive_path,
        start_time.elapsed(),
    );
    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("preparing sources...");
    pb
}

/// Print a formatted summary table after the batch.
fn print_summary(report: &BatchReport, rejected: usize, archive_path: &Path, elapsed: Duration) {
    let generated = report.variants.len();
    let mb_written = report.total_bytes() as f64 / 1_000_000.0;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        generated as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Sources:      {:>8}", report.sources.len());
    if !report.failures.is_empty() {
        eprintln!("    Failed:       {:>8}", report.failures.len());
    }
    if rejected > 0 {
        eprintln!("    Rejected:     {:>8}", rejected);
    }
    eprintln!("    Variants:     {:>8}", generated);
    eprintln!("  ------------------------------------");
    eprintln!("    Archive size: {:>7.1} MB", mb_written);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} variants/sec", rate);
    eprintln!("  ====================================");
    for failure in &report.failures {
        eprintln!("    ! {}: {}", failure.source_name, failure.error);
    }
    eprintln!("    Archive: {}", archive_path.display());
}
