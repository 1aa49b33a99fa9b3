//! Batch loading: bounded fan-out over the discovered files, with progress.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use tokio::sync::Semaphore;

use super::discovery::DiscoveredFile;
use super::report::LoadRecord;
use super::setup::LoadContext;
use super::writer;

/// Result of a batch run. Records keep discovery order.
pub(crate) struct BatchOutcome {
    pub records: Vec<LoadRecord>,
    pub succeeded: u64,
    pub failed: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

/// Load and persist every file, at most `ctx.parallel` at a time.
///
/// A failing file is logged and counted; it never stops the batch.
pub(crate) async fn load_batch(ctx: Arc<LoadContext>, files: Vec<DiscoveredFile>) -> BatchOutcome {
    let progress = if files.len() > 1 {
        create_progress_bar(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let start_time = Instant::now();
    let semaphore = Arc::new(Semaphore::new(ctx.parallel));
    let mut handles = Vec::with_capacity(files.len());

    for file in files {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            tracing::warn!("Load semaphore closed unexpectedly, stopping batch");
            break;
        };

        let ctx = ctx.clone();
        let path = file.path.clone();
        let handle = tokio::spawn(async move {
            let result = load_one(&ctx, &path).await;
            drop(permit);
            result
        });
        handles.push((file, handle));
    }

    let mut records = Vec::with_capacity(handles.len());
    let mut succeeded: u64 = 0;
    let mut failed: u64 = 0;
    let mut total_bytes: u64 = 0;

    for (file, handle) in handles {
        match handle.await {
            Ok(Ok(record)) => {
                succeeded += 1;
                total_bytes += file.size;
                records.push(record);
            }
            Ok(Err(e)) => {
                failed += 1;
                tracing::error!("Failed: {:?} - {:#}", file.path, e);
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Load task panicked for {:?}: {e}", file.path);
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} img/sec", (succeeded + failed) as f64 / elapsed));
        }
    }

    progress.finish_and_clear();

    BatchOutcome {
        records,
        succeeded,
        failed,
        total_bytes,
        elapsed: start_time.elapsed(),
    }
}

async fn load_one(ctx: &LoadContext, path: &Path) -> anyhow::Result<LoadRecord> {
    let photo = ctx.loader.load(path, &ctx.options).await?;
    writer::persist(path, photo, &ctx.destinations, ctx.remove_originals).await
}

fn create_progress_bar(total: u64) -> ProgressBar {
    use indicatif::ProgressStyle;

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a summary table to stderr.
pub(crate) fn print_summary(outcome: &BatchOutcome) {
    let secs = outcome.elapsed.as_secs_f64();
    let (rate, throughput) = if secs > 0.0 {
        (
            outcome.succeeded as f64 / secs,
            outcome.total_bytes as f64 / 1_000_000.0 / secs,
        )
    } else {
        (0.0, 0.0)
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Loaded:       {:>8}", outcome.succeeded);
    if outcome.failed > 0 {
        eprintln!("    Failed:       {:>8}", outcome.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", outcome.succeeded + outcome.failed);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Throughput:   {:>7.1} MB/sec", throughput);
    eprintln!("  ====================================");
}
