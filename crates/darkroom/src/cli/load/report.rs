//! Per-file load records and the JSON / JSONL report writer.

use darkroom_core::ImageInfo;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::types::ReportFormat;

/// What one successful load produced.
///
/// `target` and `thumbnail` are the infos the loader reported, so their
/// `path` names the temporary artifact. The persisted copies live at
/// `target_path` and `thumbnail_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub source: PathBuf,
    pub target: ImageInfo,
    pub target_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
    /// The source file was deleted after persisting
    pub original_removed: bool,
}

/// Serializes load records as a JSON array or as JSON lines.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects [`ReportFormat::Json`].
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    pub fn write_all(&mut self, records: &[LoadRecord]) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, records)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, records).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            ReportFormat::Jsonl => {
                for record in records {
                    serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                    writeln!(self.writer)?;
                }
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Write `records` to `path`, or to stdout when no path is given.
pub fn write_report(
    path: Option<&Path>,
    format: ReportFormat,
    records: &[LoadRecord],
) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let mut writer = ReportWriter::new(io::BufWriter::new(file), format, true);
            writer.write_all(records)?;
            writer.flush()?;
            tracing::info!("Report written to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = ReportWriter::new(stdout.lock(), format, true);
            writer.write_all(records)?;
            writer.flush()?;
        }
    }
    Ok(())
}
