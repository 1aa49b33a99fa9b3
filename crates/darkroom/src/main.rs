//! Darkroom CLI - normalize photos into target renditions and thumbnails.
//!
//! Darkroom hands every pixel operation to ImageMagick. It probes each
//! source, converts it into a size-capped target (and optionally a square
//! thumbnail) and persists both into output directories.
//!
//! # Usage
//!
//! ```bash
//! # Load a single photo
//! darkroom load image.gif --format jpg
//!
//! # Load a directory with thumbnails and a JSONL report
//! darkroom load ./photos/ --thumbnail --report loaded.jsonl --report-format jsonl
//!
//! # Inspect a file
//! darkroom probe image.png
//!
//! # View configuration
//! darkroom config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Darkroom - photo normalization on top of ImageMagick.
#[derive(Parser, Debug)]
#[command(name = "darkroom")]
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
    /// Convert photos into targets (and thumbnails) and persist them
    Load(cli::load::LoadArgs),

    /// Print what the engine reports about a file
    Probe(cli::probe::ProbeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match darkroom_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `darkroom config path`."
            );
            darkroom_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Darkroom v{}", darkroom_core::VERSION);

    match cli.command {
        Commands::Load(args) => cli::load::execute(args, config).await,
        Commands::Probe(args) => cli::probe::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
