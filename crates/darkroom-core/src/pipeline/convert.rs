//! Conversion execution: flatten policy, one engine transform, re-probe.

use std::path::Path;
use std::sync::Arc;

use super::probe::MetadataProber;
use super::resolve::ResolvedParameters;
use crate::engine::{ImageEngine, Resize, TransformCommand};
use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageInfo;

/// Formats that can hold more than one frame.
const MULTI_FRAME_FORMATS: [&str; 6] = ["gif", "webp", "tiff", "tif", "mng", "apng"];

/// Formats that can carry transparency.
const ALPHA_FORMATS: [&str; 7] = ["png", "gif", "webp", "tiff", "tif", "avif", "ico"];

/// Special handling a conversion needs before the transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlattenPolicy {
    /// Read only the first frame of the source
    pub first_frame_only: bool,
    /// Composite onto an opaque background
    pub flatten: bool,
}

impl FlattenPolicy {
    /// Decide the flags for a `source` -> `dest` format pair (case-insensitive).
    ///
    /// Frame flattening applies when a multi-frame source goes to a
    /// single-frame format; opacity flattening when an alpha-capable source
    /// goes to a format without alpha. Either one requests a single flatten.
    pub fn for_formats(source: &str, dest: &str) -> Self {
        let source = source.to_lowercase();
        let dest = dest.to_lowercase();

        let drops_frames = is_multi_frame(&source) && !is_multi_frame(&dest);
        let drops_alpha = has_alpha(&source) && !has_alpha(&dest);

        Self {
            first_frame_only: drops_frames,
            flatten: drops_frames || drops_alpha,
        }
    }
}

fn is_multi_frame(format: &str) -> bool {
    MULTI_FRAME_FORMATS.contains(&format)
}

fn has_alpha(format: &str) -> bool {
    ALPHA_FORMATS.contains(&format)
}

/// Runs a single transform through the engine and reports on the result.
#[derive(Clone)]
pub struct ConversionExecutor {
    engine: Arc<dyn ImageEngine>,
    prober: MetadataProber,
}

impl ConversionExecutor {
    pub fn new(engine: Arc<dyn ImageEngine>) -> Self {
        Self {
            prober: MetadataProber::new(engine.clone()),
            engine,
        }
    }

    /// Build the transform for `src` -> `dest` under `params`.
    pub fn command(src: &Path, dest: &Path, params: &ResolvedParameters) -> TransformCommand {
        let policy = FlattenPolicy::for_formats(&params.source_format, &params.output_format);

        let resize = match (params.resize, params.size_cap) {
            (Some((width, height)), _) => Some(Resize::Exact { width, height }),
            (None, Some(cap)) => Some(Resize::Cap(cap)),
            (None, None) => None,
        };

        TransformCommand {
            first_frame_only: policy.first_frame_only,
            flatten: policy.flatten,
            crop: params.crop,
            resize,
            quality: Some(params.quality),
            density: Some(params.density),
            ..TransformCommand::new(src, dest)
        }
    }

    /// Convert `src` into `dest` and return the probed facts about `dest`.
    ///
    /// The returned info always comes from re-inspecting the written file,
    /// never from the requested parameters.
    pub async fn convert(
        &self,
        src: &Path,
        dest: &Path,
        params: &ResolvedParameters,
    ) -> PipelineResult<ImageInfo> {
        let command = Self::command(src, dest, params);
        tracing::debug!(
            "{}: {}",
            self.engine.name(),
            command.to_args().join(" ")
        );

        let start = std::time::Instant::now();
        self.engine
            .convert(&command)
            .await
            .map_err(|e| PipelineError::Conversion {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                message: e.to_string(),
            })?;
        tracing::trace!("  Convert {:?}: {:?}", dest, start.elapsed());

        self.prober.probe(dest).await
    }
}
