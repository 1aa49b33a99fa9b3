//! Photo loading pipeline components.
//!
//! Stages, in the order a load runs them:
//! - **probe**: Inspect a file through the engine and build `ImageInfo`
//! - **resolve**: Derive quality, size caps and crop boxes from probed facts
//! - **artifact**: Reserve uniquely named temporary files
//! - **convert**: Run one engine transform and re-probe its output
//! - **cleaner**: Remove a load's temporary files exactly once
//! - **loader**: Orchestrates the full pipeline

pub mod artifact;
pub mod cleaner;
pub mod convert;
pub mod loader;
pub mod probe;
pub mod resolve;

// Re-exports for convenient access
pub use artifact::{is_artifact_path, Artifact, ArtifactAllocator, ArtifactRole};
pub use cleaner::{Cleaner, CleanerState};
pub use convert::{ConversionExecutor, FlattenPolicy};
pub use loader::{LoadedPhoto, PhotoLoader};
pub use probe::{parse_identify_output, MetadataProber, FRAME_TEMPLATE};
pub use resolve::{resolve, ConversionOptions, ResolvedConversion, ResolvedParameters};
