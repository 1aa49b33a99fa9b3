//! Temporary artifact reservation and the artifact handed back to callers.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageInfo;

/// Which rendition a temporary file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    Target,
    Thumbnail,
}

impl ArtifactRole {
    pub const ALL: [ArtifactRole; 2] = [ArtifactRole::Target, ArtifactRole::Thumbnail];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactRole::Target => "target",
            ArtifactRole::Thumbnail => "thumbnail",
        }
    }

    /// File name prefix of temporary files reserved for this role.
    pub fn file_prefix(&self) -> String {
        format!("darkroom-{self}-")
    }
}

/// True when `path` is named like a temporary artifact the allocator reserves.
pub fn is_artifact_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| {
            ArtifactRole::ALL
                .iter()
                .any(|role| name.starts_with(&role.file_prefix()))
        })
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserves uniquely named files in a working directory.
///
/// Names look like `darkroom-target-Ab3xY9qZ.jpeg`. The file is created
/// empty and kept: ownership passes to the caller, who must delete it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactAllocator;

impl ArtifactAllocator {
    /// Reserve a fresh path in `dir` for a `role` artifact with suffix `format`.
    pub async fn allocate(
        &self,
        dir: &Path,
        role: ArtifactRole,
        format: &str,
    ) -> PipelineResult<PathBuf> {
        let dir_owned = dir.to_path_buf();
        let prefix = role.file_prefix();
        let suffix = format!(".{}", format.to_lowercase());

        let reserved = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(&suffix)
                .rand_bytes(8)
                .tempfile_in(&dir_owned)
                .and_then(|file| file.keep().map_err(|e| e.error))
                .map(|(_, path)| path)
        })
        .await;

        match reserved {
            Ok(Ok(path)) => {
                tracing::trace!("  Reserved {role} artifact {:?}", path);
                Ok(path)
            }
            Ok(Err(e)) => Err(PipelineError::Allocation {
                dir: dir.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) => Err(PipelineError::Allocation {
                dir: dir.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
        }
    }
}

/// One produced file: its probed facts and an open stream over its bytes.
#[derive(Debug)]
pub struct Artifact {
    pub info: ImageInfo,
    pub stream: tokio::fs::File,
}

impl Artifact {
    /// Open a read stream over the file `info` describes.
    pub(crate) async fn open(info: ImageInfo) -> std::io::Result<Self> {
        let stream = tokio::fs::File::open(&info.path).await?;
        Ok(Self { info, stream })
    }

    /// Location of the temporary file backing this artifact.
    pub fn path(&self) -> &Path {
        &self.info.path
    }
}
