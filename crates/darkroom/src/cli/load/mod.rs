//! The `darkroom load` command: convert photos and persist the results.

mod batch;
mod discovery;
mod report;
mod setup;
pub mod types;
mod writer;

pub use types::ReportFormat;

use clap::Args;
use darkroom_core::Config;
use std::path::PathBuf;
use std::sync::Arc;

use batch::{load_batch, print_summary};
use discovery::{colliding_stems, FileDiscovery};
use report::write_report;
use setup::setup_loader;

/// Arguments for the `load` command.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Image file or directory to load
    #[arg(required = true)]
    pub input: PathBuf,

    /// Also produce a square thumbnail
    #[arg(long)]
    pub thumbnail: bool,

    /// Target format (defaults to the source format)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Thumbnail format (defaults to the source format)
    #[arg(long)]
    pub thumbnail_format: Option<String>,

    /// Target quality, 1-100
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Thumbnail edge length in pixels
    #[arg(long)]
    pub thumbnail_size: Option<u32>,

    /// Directory for temporary files (defaults to each source's directory)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Cap the target's pixel area
    #[arg(long, conflicts_with_all = ["max_width", "max_height"])]
    pub max_area: Option<u64>,

    /// Cap the target's width (requires --max-height)
    #[arg(long, requires = "max_height")]
    pub max_width: Option<u32>,

    /// Cap the target's height (requires --max-width)
    #[arg(long, requires = "max_width")]
    pub max_height: Option<u32>,

    /// Directory targets are written into
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// Directory thumbnails are written into
    #[arg(long)]
    pub thumbnail_dir: Option<PathBuf>,

    /// Delete each source once its artifacts are written
    #[arg(long)]
    pub remove_originals: bool,

    /// Write the load report here instead of stdout
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormat,

    /// Number of files loaded at once
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Empty the target and thumbnail directories first
    #[arg(long)]
    pub fresh: bool,
}

/// Values match the clap annotations above.
impl Default for LoadArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            thumbnail: false,
            format: None,
            thumbnail_format: None,
            quality: None,
            thumbnail_size: None,
            working_dir: None,
            max_area: None,
            max_width: None,
            max_height: None,
            target_dir: None,
            thumbnail_dir: None,
            remove_originals: false,
            report: None,
            report_format: ReportFormat::Json,
            parallel: None,
            fresh: false,
        }
    }
}

/// Execute the load command.
pub async fn execute(args: LoadArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_loader(&args, config).await?;

    let mut discovery = FileDiscovery::new(&ctx.supported_formats)
        .exclude(&ctx.destinations.target_dir)
        .exclude(&ctx.destinations.thumbnail_dir);
    if let Some(dir) = &ctx.options.working_dir {
        discovery = discovery.exclude(dir);
    }
    let files = discovery.discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to load", files.len());

    for stem in colliding_stems(&files) {
        tracing::warn!("Several sources are named {stem:?}; their outputs overwrite each other");
    }

    if args.fresh {
        if ctx.destinations.contains(&args.input) {
            anyhow::bail!(
                "Refusing --fresh: input {:?} is inside an output directory",
                args.input
            );
        }
        let removed = ctx.destinations.empty().await?;
        tracing::info!("Removed {removed} previous output(s)");
    }
    ctx.destinations.create().await?;

    let total = files.len();
    let outcome = load_batch(Arc::new(ctx), files).await;

    if total > 1 {
        print_summary(&outcome);
    }

    if !outcome.records.is_empty() {
        write_report(args.report.as_deref(), args.report_format, &outcome.records)?;
    }

    if outcome.succeeded == 0 {
        anyhow::bail!("No files were loaded ({} failed)", outcome.failed);
    }
    Ok(())
}
