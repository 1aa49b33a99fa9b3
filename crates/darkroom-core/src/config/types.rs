//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::SizeCap;

/// External engine command lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Command used to inspect files (e.g. `["magick", "identify"]` on IM7)
    pub identify: Vec<String>,

    /// Command used to transform files
    pub convert: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            identify: vec!["identify".to_string()],
            convert: vec!["convert".to_string()],
        }
    }
}

/// Target rendition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Encoder quality (1-100)
    pub quality: u8,

    /// Output density in pixels per inch
    pub density: u32,

    /// Output format override; the source's own format when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Size cap policy for the target
    pub size_cap: SizeCap,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            quality: 75,
            density: 72,
            format: None,
            size_cap: SizeCap::default(),
        }
    }
}

/// Thumbnail rendition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Whether to produce a thumbnail alongside the target
    pub enabled: bool,

    /// Edge length of the square thumbnail in pixels
    pub resolution: u32,

    /// Quality override; falls back to `conversion.quality`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,

    /// Density override; falls back to `conversion.density`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<u32>,

    /// Format override; falls back to the source's format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            resolution: 128,
            quality: None,
            density: None,
            format: None,
        }
    }
}

/// Where temporary and final files go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for temporary artifacts; the source's directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Directory targets are persisted into
    pub target_dir: PathBuf,

    /// Directory thumbnails are persisted into
    pub thumbnail_dir: PathBuf,

    /// Delete the source file once its artifacts are persisted
    pub remove_originals: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            target_dir: PathBuf::from(".targets"),
            thumbnail_dir: PathBuf::from(".thumbnails"),
            remove_originals: false,
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of photos loaded at once
    pub parallel_workers: usize,

    /// File extensions picked up when scanning a directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: ["gif", "png", "jpg", "jpeg", "webp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: pretty or json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
