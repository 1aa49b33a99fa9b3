//! Persisting loaded artifacts into the output directories.

use anyhow::Context;
use darkroom_core::{Artifact, ImageInfo, LoadedPhoto};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::report::LoadRecord;

/// Where persisted targets and thumbnails go.
#[derive(Debug, Clone)]
pub struct Destinations {
    pub target_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
}

impl Destinations {
    /// Create both output directories if missing.
    pub async fn create(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.target_dir).await?;
        tokio::fs::create_dir_all(&self.thumbnail_dir).await
    }

    /// Remove everything inside both output directories.
    pub async fn empty(&self) -> std::io::Result<usize> {
        let removed = empty_dir(&self.target_dir).await?;
        Ok(removed + empty_dir(&self.thumbnail_dir).await?)
    }

    /// True when `path` lies inside either output directory.
    pub fn contains(&self, path: &Path) -> bool {
        let Ok(path) = path.canonicalize() else {
            return false;
        };
        [&self.target_dir, &self.thumbnail_dir]
            .iter()
            .filter_map(|dir| dir.canonicalize().ok())
            .any(|dir| path.starts_with(dir))
    }
}

/// Stream the artifacts of `photo` into `destinations`, then run its cleaner.
///
/// The original is only removed when `remove_original` is set and every
/// artifact was written. Temporary files are removed either way.
pub async fn persist(
    source: &Path,
    photo: LoadedPhoto,
    destinations: &Destinations,
    remove_original: bool,
) -> anyhow::Result<LoadRecord> {
    let LoadedPhoto {
        target,
        thumbnail,
        cleaner,
    } = photo;

    let written = write_artifacts(source, target, thumbnail, destinations).await;

    let include_original = remove_original && written.is_ok();
    cleaner.clean(include_original).await;

    let (target, thumbnail) = written?;
    let (thumbnail, thumbnail_path) = thumbnail.unzip();
    Ok(LoadRecord {
        source: source.to_path_buf(),
        target: target.0,
        target_path: target.1,
        thumbnail,
        thumbnail_path,
        original_removed: include_original && !source.exists(),
    })
}

/// Info of a written artifact and where its copy landed.
type Persisted = (ImageInfo, PathBuf);

async fn write_artifacts(
    source: &Path,
    target: Artifact,
    thumbnail: Option<Artifact>,
    destinations: &Destinations,
) -> anyhow::Result<(Persisted, Option<Persisted>)> {
    let target_dest = destination(&destinations.target_dir, source, target.path());
    let target = (copy_artifact(target, &target_dest).await?, target_dest);

    let thumbnail = match thumbnail {
        Some(artifact) => {
            let dest = destination(&destinations.thumbnail_dir, source, artifact.path());
            Some((copy_artifact(artifact, &dest).await?, dest))
        }
        None => None,
    };

    Ok((target, thumbnail))
}

/// Copy one artifact's stream to `dest` and hand back its info untouched.
async fn copy_artifact(mut artifact: Artifact, dest: &Path) -> anyhow::Result<ImageInfo> {
    let mut out = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("cannot create {:?}", dest))?;
    tokio::io::copy(&mut artifact.stream, &mut out)
        .await
        .with_context(|| format!("cannot write {:?}", dest))?;
    out.flush().await?;

    tracing::debug!("Persisted {:?} -> {:?}", artifact.path(), dest);

    Ok(artifact.info)
}

/// `<dir>/<source stem>.<artifact extension>`.
fn destination(dir: &Path, source: &Path, artifact: &Path) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "photo".into());
    if let Some(ext) = artifact.extension() {
        name.push(".");
        name.push(ext);
    }
    dir.join(name)
}

async fn empty_dir(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        removed += 1;
    }
    Ok(removed)
}
