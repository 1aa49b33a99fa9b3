//! Idempotent, best-effort removal of the temporary files one load produced.

use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const CLEANED: u8 = 1;

/// Lifecycle of a [`Cleaner`]. The only transition is `Pending -> Cleaned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanerState {
    Pending,
    Cleaned,
}

/// Owns the temporary paths created by one load.
///
/// Nothing is deleted automatically: the caller decides when the artifacts
/// have been consumed and calls [`clean`](Self::clean).
#[derive(Debug)]
#[must_use = "temporary artifacts stay on disk until `clean` is called"]
pub struct Cleaner {
    original: PathBuf,
    files: Vec<PathBuf>,
    state: AtomicU8,
}

impl Cleaner {
    pub fn new(original: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self {
            original: original.into(),
            files,
            state: AtomicU8::new(PENDING),
        }
    }

    /// Tracked temporary paths (target first, then thumbnail if any).
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The source file this load read from.
    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn state(&self) -> CleanerState {
        match self.state.load(Ordering::Acquire) {
            PENDING => CleanerState::Pending,
            _ => CleanerState::Cleaned,
        }
    }

    /// Delete every tracked file, plus the original when `include_original` is set.
    ///
    /// Only the first call does any work; it returns `true` once every
    /// deletion has been attempted. Later calls return `false` immediately.
    /// Individual deletion failures are logged and swallowed.
    pub async fn clean(&self, include_original: bool) -> bool {
        if self
            .state
            .compare_exchange(PENDING, CLEANED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let mut targets: Vec<&Path> = self.files.iter().map(PathBuf::as_path).collect();
        if include_original {
            targets.push(&self.original);
        }

        let results = join_all(targets.iter().map(|path| tokio::fs::remove_file(path))).await;

        let mut removed = 0usize;
        for (path, result) in targets.iter().zip(results) {
            match result {
                Ok(()) => removed += 1,
                Err(e) => tracing::debug!("Ignoring cleanup failure for {:?}: {e}", path),
            }
        }
        tracing::debug!("Cleaned {removed}/{} file(s)", targets.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"x").unwrap();
        path
    }

    #[tokio::test]
    async fn test_clean_removes_tracked_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let original = touch(dir.path(), "photo.jpg");
        let target = touch(dir.path(), "darkroom-target-1.jpeg");
        let thumb = touch(dir.path(), "darkroom-thumbnail-1.jpeg");

        let cleaner = Cleaner::new(&original, vec![target.clone(), thumb.clone()]);
        assert_eq!(cleaner.state(), CleanerState::Pending);

        assert!(cleaner.clean(false).await);
        assert_eq!(cleaner.state(), CleanerState::Cleaned);
        assert!(!target.exists());
        assert!(!thumb.exists());
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_clean_can_include_original() {
        let dir = tempfile::tempdir().unwrap();
        let original = touch(dir.path(), "photo.jpg");
        let target = touch(dir.path(), "t.jpeg");

        let cleaner = Cleaner::new(&original, vec![target.clone()]);
        cleaner.clean(true).await;
        assert!(!target.exists());
        assert!(!original.exists());
    }

    #[tokio::test]
    async fn test_second_clean_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let original = touch(dir.path(), "photo.jpg");
        let target = touch(dir.path(), "t.jpeg");

        let cleaner = Cleaner::new(&original, vec![target.clone()]);
        assert!(cleaner.clean(false).await);

        // A file reappearing at the same path must survive the second call
        touch(dir.path(), "t.jpeg");
        assert!(!cleaner.clean(true).await);
        assert!(target.exists());
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_missing_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let original = touch(dir.path(), "photo.jpg");
        let present = touch(dir.path(), "present.jpeg");
        let gone = dir.path().join("already-gone.jpeg");

        let cleaner = Cleaner::new(&original, vec![gone, present.clone()]);
        assert!(cleaner.clean(false).await);
        assert!(!present.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clean_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let original = touch(dir.path(), "photo.jpg");
        let target = touch(dir.path(), "t.jpeg");
        let cleaner = std::sync::Arc::new(Cleaner::new(&original, vec![target]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cleaner = cleaner.clone();
                tokio::spawn(async move { cleaner.clean(false).await })
            })
            .collect();

        let mut performed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                performed += 1;
            }
        }
        assert_eq!(performed, 1);
    }
}
