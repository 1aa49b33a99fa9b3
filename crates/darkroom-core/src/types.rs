//! Core data types shared by the pipeline stages.
//!
//! These types describe what the engine reported about a file and the
//! geometry the pipeline asks it to produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Facts about an image file, as reported by the engine.
///
/// Built by the prober, either for a source or for a freshly converted
/// artifact. For multi-frame files `width`/`height` are the largest values
/// seen on any frame; every other scalar comes from the last frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// File the engine inspected
    pub path: PathBuf,

    /// Engine format tag ("JPEG", "PNG", "GIF", ...)
    pub format: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// File size in bytes
    pub file_size: u64,

    /// Bits per channel
    pub depth: u32,

    /// Resolution with unit tokens stripped ("72x72")
    pub density: String,

    /// Unit the density was expressed in, when the engine named one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density_unit: Option<DensityUnit>,

    /// MIME type derived from the format tag
    pub media_type: String,

    /// Quality the file was encoded with (lossy formats only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,

    /// Number of frames the engine reported
    pub frame_count: usize,
}

impl ImageInfo {
    /// Total pixel area of the largest frame.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Format tag lower-cased, as used for file suffixes.
    pub fn format_lowercase(&self) -> String {
        self.format.to_lowercase()
    }
}

/// Units the engine can attach to a density value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityUnit {
    PixelsPerInch,
    PixelsPerCentimeter,
}

impl DensityUnit {
    /// Parse the engine's unit token. `Undefined` and anything unknown map to `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "PixelsPerInch" => Some(Self::PixelsPerInch),
            "PixelsPerCentimeter" => Some(Self::PixelsPerCentimeter),
            _ => None,
        }
    }
}

/// Upper bound on the size of a converted target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SizeCap {
    /// Cap on total pixel area, aspect ratio preserved
    Area { max_area: u64 },
    /// Independent caps on each axis, aspect ratio preserved
    Dimensions { max_width: u32, max_height: u32 },
}

impl Default for SizeCap {
    fn default() -> Self {
        Self::Area {
            max_area: 1_000_000,
        }
    }
}

/// Square region cut out of a source before thumbnail resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    /// Edge length of the square
    pub size: u32,
    /// Horizontal offset from the left edge
    pub x: u32,
    /// Vertical offset from the top edge
    pub y: u32,
}

impl CropBox {
    /// The largest centered square that fits in `width` x `height`.
    pub fn centered_square(width: u32, height: u32) -> Self {
        let size = width.min(height);
        let x = if width > size { (width - size) / 2 } else { 0 };
        let y = if height > size { (height - size) / 2 } else { 0 };
        Self { size, x, y }
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}+{1}+{2}", self.size, self.x, self.y)
    }
}

/// Look up the media type for an engine format tag.
///
/// Falls back to `application/octet-stream` for tags the table does not know.
pub fn media_type_for(format: &str) -> String {
    mime_guess::from_ext(&format.to_lowercase())
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| mime_guess::mime::APPLICATION_OCTET_STREAM.to_string())
}
