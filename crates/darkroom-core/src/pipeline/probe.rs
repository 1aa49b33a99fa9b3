//! Metadata probing through the engine's per-frame inspection.

use std::path::Path;
use std::sync::Arc;

use crate::engine::ImageEngine;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{media_type_for, DensityUnit, ImageInfo};

/// Per-frame template: format, width, height, byte size, depth, density.
pub const FRAME_TEMPLATE: &str = "%m %w %h %b %z %x x %y\n";

/// Template for the encoder quality the file was written with.
pub const QUALITY_TEMPLATE: &str = "%Q\n";

/// Density tokens that carry a unit rather than a value.
const UNIT_TOKENS: [&str; 3] = ["Undefined", "PixelsPerInch", "PixelsPerCentimeter"];

/// Formats whose embedded quality is worth asking about.
const LOSSY_FORMATS: [&str; 6] = ["JPEG", "JPG", "WEBP", "JP2", "HEIC", "AVIF"];

/// Index of the first density token in a frame line.
const DENSITY_FIELD: usize = 5;

/// One parsed line of inspection output.
#[derive(Debug, Clone, PartialEq)]
struct FrameRecord {
    format: String,
    width: u32,
    height: u32,
    file_size: u64,
    depth: u32,
    density: String,
    density_unit: Option<DensityUnit>,
}

/// Turns engine inspection output into [`ImageInfo`].
#[derive(Clone)]
pub struct MetadataProber {
    engine: Arc<dyn ImageEngine>,
}

impl MetadataProber {
    pub fn new(engine: Arc<dyn ImageEngine>) -> Self {
        Self { engine }
    }

    /// Probe `path` and collapse all of its frames into one record.
    pub async fn probe(&self, path: &Path) -> PipelineResult<ImageInfo> {
        let stdout = self
            .engine
            .identify(path, FRAME_TEMPLATE)
            .await
            .map_err(|e| PipelineError::Probe {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut info = parse_identify_output(path, &stdout)?;

        if LOSSY_FORMATS.contains(&info.format.to_uppercase().as_str()) {
            info.quality = self.probe_quality(path).await;
        }

        tracing::debug!(
            "Probed {:?}: {} {}x{} ({} frame(s))",
            path,
            info.format,
            info.width,
            info.height,
            info.frame_count
        );
        Ok(info)
    }

    /// Ask for the embedded quality. Lenient: any failure means "unknown".
    async fn probe_quality(&self, path: &Path) -> Option<u8> {
        let stdout = match self.engine.identify(path, QUALITY_TEMPLATE).await {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!("Quality probe failed for {:?}: {e}", path);
                return None;
            }
        };
        stdout
            .lines()
            .filter_map(|line| line.trim().parse::<u8>().ok())
            .last()
            .filter(|q| (1..=100).contains(q))
    }
}

/// Parse the output of [`FRAME_TEMPLATE`] for `path`.
///
/// Width and height are the maxima across frames; every other field comes
/// from the last frame. Quality is left unset.
pub fn parse_identify_output(path: &Path, output: &str) -> PipelineResult<ImageInfo> {
    let probe_err = |message: String| PipelineError::Probe {
        path: path.to_path_buf(),
        message,
    };

    let frames = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_frame_line)
        .collect::<Result<Vec<_>, _>>()
        .map_err(probe_err)?;

    let last = frames
        .last()
        .ok_or_else(|| probe_err("engine reported no frames".to_string()))?;
    let width = frames.iter().map(|f| f.width).max().unwrap_or(last.width);
    let height = frames.iter().map(|f| f.height).max().unwrap_or(last.height);

    Ok(ImageInfo {
        path: path.to_path_buf(),
        format: last.format.clone(),
        width,
        height,
        file_size: last.file_size,
        depth: last.depth,
        density: last.density.clone(),
        density_unit: last.density_unit,
        media_type: media_type_for(&last.format),
        quality: None,
        frame_count: frames.len(),
    })
}

fn parse_frame_line(line: &str) -> Result<FrameRecord, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() <= DENSITY_FIELD {
        return Err(format!(
            "expected at least {} fields, got {}: {line:?}",
            DENSITY_FIELD + 1,
            tokens.len()
        ));
    }

    let int = |idx: usize, name: &str| -> Result<u32, String> {
        tokens[idx]
            .parse::<u32>()
            .map_err(|_| format!("bad {name} {:?} in {line:?}", tokens[idx]))
    };

    let mut density_unit = None;
    let mut density = String::new();
    for &token in &tokens[DENSITY_FIELD..] {
        if UNIT_TOKENS.contains(&token) {
            density_unit = density_unit.or(DensityUnit::from_token(token));
        } else {
            density.push_str(token);
        }
    }

    Ok(FrameRecord {
        format: tokens[0].to_string(),
        width: int(1, "width")?,
        height: int(2, "height")?,
        file_size: parse_byte_size(tokens[3])
            .ok_or_else(|| format!("bad byte size {:?} in {line:?}", tokens[3]))?,
        depth: int(4, "depth")?,
        density,
        density_unit,
    })
}

/// Parse the engine's byte-size field ("83412B", "81.5KB", "1.2MiB", "4096").
pub(crate) fn parse_byte_size(token: &str) -> Option<u64> {
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (number, suffix) = token.split_at(split);
    let value: f64 = number.parse().ok()?;

    let multiplier: f64 = match suffix {
        "" | "B" => 1.0,
        "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((value * multiplier).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedEngine;

    #[test]
    fn test_parse_single_frame_with_units() {
        let info = parse_identify_output(
            Path::new("/photos/a.jpg"),
            "JPEG 800 600 83412B 8 72 PixelsPerInch x 72 PixelsPerInch\n",
        )
        .unwrap();
        assert_eq!(info.format, "JPEG");
        assert_eq!((info.width, info.height), (800, 600));
        assert_eq!(info.file_size, 83412);
        assert_eq!(info.depth, 8);
        assert_eq!(info.density, "72x72");
        assert_eq!(info.density_unit, Some(DensityUnit::PixelsPerInch));
        assert_eq!(info.media_type, "image/jpeg");
        assert_eq!(info.frame_count, 1);
        assert!(info.quality.is_none());
    }

    #[test]
    fn test_parse_undefined_unit_is_dropped() {
        let info = parse_identify_output(
            Path::new("a.png"),
            "PNG 10 10 200B 8 28.35 Undefined x 28.35 Undefined",
        )
        .unwrap();
        assert_eq!(info.density, "28.35x28.35");
        assert_eq!(info.density_unit, None);
    }

    #[test]
    fn test_multi_frame_takes_max_dimensions_and_last_scalars() {
        let output = "GIF 300 200 5000B 8 72 x 72\n\
                      GIF 310 180 5000B 8 72 x 72\n\
                      GIF 320 200 5000B 4 96 x 96\n";
        let info = parse_identify_output(Path::new("anim.gif"), output).unwrap();
        assert_eq!(info.width, 320);
        assert_eq!(info.height, 200);
        assert_eq!(info.depth, 4);
        assert_eq!(info.density, "96x96");
        assert_eq!(info.frame_count, 3);
    }

    #[test]
    fn test_max_height_may_come_from_an_earlier_frame() {
        let output = "GIF 100 400 10B 8 72 x 72\nGIF 150 100 10B 8 72 x 72\n";
        let info = parse_identify_output(Path::new("anim.gif"), output).unwrap();
        assert_eq!((info.width, info.height), (150, 400));
    }

    #[test]
    fn test_empty_output_is_probe_error() {
        let err = parse_identify_output(Path::new("x.png"), "\n").unwrap_err();
        assert!(matches!(err, PipelineError::Probe { .. }));
    }

    #[test]
    fn test_short_line_is_probe_error() {
        let err = parse_identify_output(Path::new("x.png"), "PNG 10 10 20B 8").unwrap_err();
        assert!(err.to_string().contains("expected at least 6 fields"));
    }

    #[test]
    fn test_non_numeric_width_is_probe_error() {
        let err =
            parse_identify_output(Path::new("x.png"), "PNG wide 10 20B 8 72 x 72").unwrap_err();
        assert!(err.to_string().contains("bad width"));
    }

    #[test]
    fn test_parse_byte_size_suffixes() {
        assert_eq!(parse_byte_size("4096"), Some(4096));
        assert_eq!(parse_byte_size("83412B"), Some(83412));
        assert_eq!(parse_byte_size("81.5KB"), Some(81_500));
        assert_eq!(parse_byte_size("2KiB"), Some(2048));
        assert_eq!(parse_byte_size("1.5MB"), Some(1_500_000));
        assert_eq!(parse_byte_size("12XB"), None);
        assert_eq!(parse_byte_size("B"), None);
    }

    #[tokio::test]
    async fn test_probe_reads_embedded_quality_for_jpeg() {
        let engine = ScriptedEngine::new()
            .with_source("/p/a.jpg", "JPEG 800 600 1000B 8 72 x 72")
            .with_quality("/p/a.jpg", 92);
        let prober = MetadataProber::new(Arc::new(engine));
        let info = prober.probe(Path::new("/p/a.jpg")).await.unwrap();
        assert_eq!(info.quality, Some(92));
    }

    #[tokio::test]
    async fn test_probe_skips_quality_for_lossless_formats() {
        let engine = ScriptedEngine::new()
            .with_source("/p/a.png", "PNG 800 600 1000B 8 72 x 72")
            .with_quality("/p/a.png", 92);
        let prober = MetadataProber::new(Arc::new(engine));
        let info = prober.probe(Path::new("/p/a.png")).await.unwrap();
        assert!(info.quality.is_none());
    }

    #[tokio::test]
    async fn test_probe_engine_failure_is_probe_error() {
        let prober = MetadataProber::new(Arc::new(ScriptedEngine::new()));
        let err = prober.probe(Path::new("/p/missing.jpg")).await.unwrap_err();
        match err {
            PipelineError::Probe { path, .. } => assert_eq!(path, Path::new("/p/missing.jpg")),
            other => panic!("expected probe error, got {other}"),
        }
    }
}
