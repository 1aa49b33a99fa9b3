//! Boundary to the external image engine.
//!
//! All pixel work happens in a subprocess. The pipeline only talks to it
//! through [`ImageEngine`], so tests can swap in a scripted responder.

pub(crate) mod command;
pub(crate) mod imagemagick;

pub use command::{Resize, TransformCommand};
pub use imagemagick::ImageMagick;

use crate::error::EngineError;
use async_trait::async_trait;
use std::path::Path;

/// Interface every image engine implements.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the pipeline holds an `Arc<dyn ImageEngine>`).
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Engine name for logging (e.g., "imagemagick").
    fn name(&self) -> &str;

    /// Report the engine's version banner, failing if it cannot be run.
    async fn version(&self) -> Result<String, EngineError>;

    /// Inspect `path`, printing `template` once per frame. Returns raw stdout.
    async fn identify(&self, path: &Path, template: &str) -> Result<String, EngineError>;

    /// Run one transform to completion.
    async fn convert(&self, command: &TransformCommand) -> Result<(), EngineError>;
}
