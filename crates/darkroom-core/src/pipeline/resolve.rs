//! Conversion parameter resolution: probed facts + caller options -> concrete parameters.
//!
//! Pure functions only; nothing here touches the filesystem or the engine.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CropBox, ImageInfo, SizeCap};

/// What the caller asks a load to produce.
///
/// `Default` carries the documented defaults: quality 75, density 72,
/// a 1,000,000 px² area cap, no thumbnail, 128 px thumbnails.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    /// Target encoder quality (1-100)
    pub quality: u8,
    /// Target density
    pub density: u32,
    /// Size cap policy for the target
    pub size_cap: SizeCap,
    /// Target format override
    pub format: Option<String>,
    /// Produce a square thumbnail as well
    pub thumbnail: bool,
    /// Thumbnail edge length in pixels
    pub thumbnail_resolution: u32,
    /// Thumbnail quality; falls back to `quality`
    pub thumbnail_quality: Option<u8>,
    /// Thumbnail density; falls back to `density`
    pub thumbnail_density: Option<u32>,
    /// Thumbnail format override
    pub thumbnail_format: Option<String>,
    /// Directory for temporary artifacts; the source's directory when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            quality: 75,
            density: 72,
            size_cap: SizeCap::default(),
            format: None,
            thumbnail: false,
            thumbnail_resolution: 128,
            thumbnail_quality: None,
            thumbnail_density: None,
            thumbnail_format: None,
            working_dir: None,
        }
    }
}

impl ConversionOptions {
    /// Build options from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            quality: config.conversion.quality,
            density: config.conversion.density,
            size_cap: config.conversion.size_cap,
            format: config.conversion.format.clone(),
            thumbnail: config.thumbnail.enabled,
            thumbnail_resolution: config.thumbnail.resolution,
            thumbnail_quality: config.thumbnail.quality,
            thumbnail_density: config.thumbnail.density,
            thumbnail_format: config.thumbnail.format.clone(),
            working_dir: config.working_dir(),
        }
    }
}

/// Concrete parameters for one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    /// Engine format tag of the source
    pub source_format: String,
    /// Lower-cased output format, also used as the file suffix
    pub output_format: String,
    /// Effective quality, never above the source's embedded quality
    pub quality: u8,
    pub density: u32,
    /// Effective size cap (targets only)
    pub size_cap: Option<SizeCap>,
    /// Square crop applied before resizing (thumbnails only)
    pub crop: Option<CropBox>,
    /// Exact output box after the crop (thumbnails only)
    pub resize: Option<(u32, u32)>,
}

/// Parameters for everything one load produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConversion {
    pub target: ResolvedParameters,
    pub thumbnail: Option<ResolvedParameters>,
}

/// Derive target (and thumbnail) parameters from probed metadata and options.
pub fn resolve(info: &ImageInfo, options: &ConversionOptions) -> PipelineResult<ResolvedConversion> {
    let invalid = |message: &str| PipelineError::InvalidInput {
        path: info.path.clone(),
        message: message.to_string(),
    };

    if info.width == 0 || info.height == 0 {
        return Err(invalid("source has zero width or height"));
    }
    check_quality(options.quality).map_err(invalid)?;
    if let Some(q) = options.thumbnail_quality {
        check_quality(q).map_err(invalid)?;
    }
    if options.density == 0 || options.thumbnail_density == Some(0) {
        return Err(invalid("density must be > 0"));
    }
    if options.thumbnail && options.thumbnail_resolution == 0 {
        return Err(invalid("thumbnail resolution must be > 0"));
    }

    let target = ResolvedParameters {
        source_format: info.format.clone(),
        output_format: output_format(info, options.format.as_deref()),
        quality: effective_quality(info.quality, options.quality),
        density: options.density,
        size_cap: Some(effective_size_cap(info, options.size_cap).map_err(invalid)?),
        crop: None,
        resize: None,
    };

    let thumbnail = options.thumbnail.then(|| ResolvedParameters {
        source_format: info.format.clone(),
        output_format: output_format(info, options.thumbnail_format.as_deref()),
        quality: effective_quality(
            info.quality,
            options.thumbnail_quality.unwrap_or(options.quality),
        ),
        density: options.thumbnail_density.unwrap_or(options.density),
        size_cap: None,
        crop: Some(CropBox::centered_square(info.width, info.height)),
        resize: Some((options.thumbnail_resolution, options.thumbnail_resolution)),
    });

    Ok(ResolvedConversion { target, thumbnail })
}

/// `min(embedded, requested)` when the source carries a quality.
pub fn effective_quality(embedded: Option<u8>, requested: u8) -> u8 {
    embedded.map_or(requested, |q| q.min(requested))
}

/// Clamp the requested cap to the source's own size so nothing is enlarged.
pub fn effective_size_cap(info: &ImageInfo, requested: SizeCap) -> Result<SizeCap, &'static str> {
    match requested {
        SizeCap::Area { max_area: 0 } => Err("area cap must be > 0"),
        SizeCap::Area { max_area } => Ok(SizeCap::Area {
            max_area: max_area.min(info.area()),
        }),
        SizeCap::Dimensions {
            max_width,
            max_height,
        } if max_width == 0 || max_height == 0 => Err("width/height caps must be > 0"),
        SizeCap::Dimensions {
            max_width,
            max_height,
        } => Ok(SizeCap::Dimensions {
            max_width: max_width.min(info.width),
            max_height: max_height.min(info.height),
        }),
    }
}

fn output_format(info: &ImageInfo, requested: Option<&str>) -> String {
    requested
        .map(str::to_lowercase)
        .unwrap_or_else(|| info.format_lowercase())
}

fn check_quality(quality: u8) -> Result<(), &'static str> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err("quality must be between 1 and 100")
    }
}
