//! Finding source photos under an input path.

use darkroom_core::pipeline::is_artifact_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Discovers photo files by extension.
///
/// Temporary artifacts left by earlier loads are never picked up, and
/// directories registered with [`exclude`](Self::exclude) are not walked.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
    excluded_dirs: Vec<PathBuf>,
}

/// A file picked up for loading.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    pub fn new(supported_formats: &[String]) -> Self {
        Self {
            supported_formats: supported_formats.iter().map(|f| f.to_lowercase()).collect(),
            excluded_dirs: Vec::new(),
        }
    }

    /// Skip `dir` while walking. Directories that don't exist are ignored.
    pub fn exclude(mut self, dir: &Path) -> Self {
        if let Ok(dir) = dir.canonicalize() {
            self.excluded_dirs.push(dir);
        }
        self
    }

    /// Discover all supported files at a path.
    ///
    /// A file path yields itself if its extension is supported; a directory
    /// is walked recursively. Results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        // An excluded directory that holds the input itself is walked anyway
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let excluded: Vec<&PathBuf> = self
            .excluded_dirs
            .iter()
            .filter(|dir| !root.starts_with(dir))
            .collect();

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry.path(), &excluded))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .filter_map(|entry| {
                let size = entry.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: entry.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn is_supported(&self, path: &Path) -> bool {
        if is_artifact_path(path) {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.supported_formats.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

fn is_excluded(path: &Path, excluded: &[&PathBuf]) -> bool {
    if excluded.is_empty() || !path.is_dir() {
        return false;
    }
    path.canonicalize()
        .map(|path| excluded.iter().any(|dir| path == **dir))
        .unwrap_or(false)
}

/// File stems shared by more than one discovered file.
///
/// Persisted artifacts are named after the source stem, so these would
/// overwrite each other in the output directories.
pub fn colliding_stems(files: &[DiscoveredFile]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for file in files {
        if let Some(stem) = file.path.file_stem() {
            *counts.entry(stem.to_string_lossy().into_owned()).or_default() += 1;
        }
    }
    let mut stems: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(stem, _)| stem)
        .collect();
    stems.sort();
    stems
}
