//! Photo loading - wires probe, resolve, allocate, convert and cleanup together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::engine::{ImageEngine, ImageMagick};
use crate::error::{PipelineError, PipelineResult};

use super::artifact::{Artifact, ArtifactAllocator, ArtifactRole};
use super::cleaner::Cleaner;
use super::convert::ConversionExecutor;
use super::probe::MetadataProber;
use super::resolve::{resolve, ConversionOptions, ResolvedParameters};

/// Everything a successful load hands back.
///
/// The caller owns the temporary files behind both artifacts and must call
/// `cleaner.clean(..)` once the streams have been consumed.
#[derive(Debug)]
#[must_use = "the cleaner must be invoked to remove temporary artifacts"]
pub struct LoadedPhoto {
    pub target: Artifact,
    pub thumbnail: Option<Artifact>,
    pub cleaner: Cleaner,
}

/// The main entry point: turns one source file into a [`LoadedPhoto`].
#[derive(Clone)]
pub struct PhotoLoader {
    engine: Arc<dyn ImageEngine>,
    prober: MetadataProber,
    executor: ConversionExecutor,
    allocator: ArtifactAllocator,
}

impl PhotoLoader {
    /// Create a loader on top of any engine implementation.
    pub fn new(engine: Arc<dyn ImageEngine>) -> Self {
        Self {
            prober: MetadataProber::new(engine.clone()),
            executor: ConversionExecutor::new(engine.clone()),
            allocator: ArtifactAllocator,
            engine,
        }
    }

    /// Create a loader backed by ImageMagick as configured.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(ImageMagick::new(&config.engine)))
    }

    /// The engine this loader drives.
    pub fn engine(&self) -> &Arc<dyn ImageEngine> {
        &self.engine
    }

    /// Probe a file without converting it.
    pub async fn probe(&self, path: &Path) -> PipelineResult<crate::types::ImageInfo> {
        self.prober.probe(path).await
    }

    /// Load `source`: probe, resolve, convert target and thumbnail concurrently.
    ///
    /// Any stage failure aborts the load. No bundle is returned and nothing
    /// is cleaned up; a temp file produced by a conversion that finished
    /// before its sibling failed stays on disk.
    pub async fn load(
        &self,
        source: &Path,
        options: &ConversionOptions,
    ) -> PipelineResult<LoadedPhoto> {
        let start = std::time::Instant::now();
        tracing::debug!("Loading: {:?}", source);

        // Probe
        let info = self.prober.probe(source).await?;
        let probe_time = start.elapsed();
        tracing::trace!("  Probe: {:?}", probe_time);

        // Resolve
        let resolved = resolve(&info, options)?;

        // Allocate
        let working_dir = working_dir_for(source, options);
        let (target_path, thumbnail_path) = tokio::try_join!(
            self.allocator.allocate(
                &working_dir,
                ArtifactRole::Target,
                &resolved.target.output_format
            ),
            self.allocate_optional(&working_dir, resolved.thumbnail.as_ref()),
        )?;

        // Convert
        let convert_start = std::time::Instant::now();
        let (target_info, thumbnail_info) = tokio::try_join!(
            self.executor
                .convert(source, &target_path, &resolved.target),
            self.convert_optional(
                source,
                thumbnail_path.as_deref(),
                resolved.thumbnail.as_ref()
            ),
        )?;
        tracing::trace!("  Convert: {:?}", convert_start.elapsed());

        // Assemble
        let mut files = vec![target_path];
        files.extend(thumbnail_path);
        let cleaner = Cleaner::new(source, files);

        let target = open_artifact(source, target_info).await?;
        let thumbnail = match thumbnail_info {
            Some(info) => Some(open_artifact(source, info).await?),
            None => None,
        };

        tracing::debug!(
            "Loaded {:?} in {:?} ({}x{} -> {}x{})",
            source,
            start.elapsed(),
            info.width,
            info.height,
            target.info.width,
            target.info.height
        );

        Ok(LoadedPhoto {
            target,
            thumbnail,
            cleaner,
        })
    }

    async fn allocate_optional(
        &self,
        dir: &Path,
        params: Option<&ResolvedParameters>,
    ) -> PipelineResult<Option<PathBuf>> {
        match params {
            Some(p) => self
                .allocator
                .allocate(dir, ArtifactRole::Thumbnail, &p.output_format)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    async fn convert_optional(
        &self,
        source: &Path,
        dest: Option<&Path>,
        params: Option<&ResolvedParameters>,
    ) -> PipelineResult<Option<crate::types::ImageInfo>> {
        match (dest, params) {
            (Some(dest), Some(params)) => self.executor.convert(source, dest, params).await.map(Some),
            _ => Ok(None),
        }
    }
}

/// Temporary files go in the requested working directory, else beside the source.
fn working_dir_for(source: &Path, options: &ConversionOptions) -> PathBuf {
    options.working_dir.clone().unwrap_or_else(|| {
        source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

async fn open_artifact(source: &Path, info: crate::types::ImageInfo) -> PipelineResult<Artifact> {
    let dest = info.path.clone();
    Artifact::open(info)
        .await
        .map_err(|e| PipelineError::Conversion {
            src: source.to_path_buf(),
            dest,
            message: format!("cannot open converted output: {e}"),
        })
}
