//! Reshade CLI - generate look-alike image variants that share no bytes or identity metadata.
//!
//! Each source image yields a configurable number of variants: slightly
//! cropped, rotated, sheared, re-toned and re-tagged, packaged into one ZIP.
//!
//! # Usage
//!
//! ```bash
//! # Five variants of one image into ./spoofed_images.zip
//! reshade generate beach.png
//!
//! # Three variants of every image under a directory, reproducibly
//! reshade generate ./photos/ -n 3 --seed 42 -o variants.zip --manifest variants.json
//!
//! # View configuration
//! reshade config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Reshade - generate byte- and metadata-distinct look-alike variants of images.
#[derive(Parser, Debug)]
#[command(name = "reshade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate variants of images and package them into an archive
    Generate(cli::generate::GenerateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match reshade_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `reshade config path`."
            );
            reshade_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Reshade v{}", reshade_core::VERSION);

    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config).await,
    }
}
