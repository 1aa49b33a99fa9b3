//! Darkroom Core - photo normalization on top of an external image engine.
//!
//! Darkroom turns a source image into a normalized *target* rendition and an
//! optional square *thumbnail*, leaving every pixel operation to ImageMagick
//! running as a subprocess.
//!
//! # Architecture
//!
//! ```text
//! Source → Probe → Resolve → Allocate → Convert (target ‖ thumbnail) → LoadedPhoto
//! ```
//!
//! The engine sits behind the [`ImageEngine`] trait, so the pipeline can be
//! driven by a scripted engine in tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use darkroom_core::{Config, ConversionOptions, PhotoLoader};
//!
//! #[tokio::main]
//! async fn main() -> darkroom_core::Result<()> {
//!     let config = Config::load()?;
//!     let loader = PhotoLoader::from_config(&config);
//!
//!     let mut photo = loader
//!         .load("./image.gif".as_ref(), &ConversionOptions::from_config(&config))
//!         .await?;
//!     let mut out = tokio::fs::File::create("./image.jpg").await?;
//!     tokio::io::copy(&mut photo.target.stream, &mut out).await?;
//!     photo.cleaner.clean(false).await;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod test_helpers;

// Re-exports for convenient access
pub use config::Config;
pub use engine::{ImageEngine, ImageMagick, TransformCommand};
pub use error::{ConfigError, DarkroomError, EngineError, PipelineError, PipelineResult, Result};
pub use pipeline::{
    Artifact, Cleaner, CleanerState, ConversionOptions, LoadedPhoto, MetadataProber, PhotoLoader,
};
pub use types::{CropBox, DensityUnit, ImageInfo, SizeCap};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
