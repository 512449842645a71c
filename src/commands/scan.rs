use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::session::SubmittedFile;

/// Extensions accepted into a batch
pub const MEDIA_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "wmv"];

/// Builds a batch from the media files one level below the root
pub struct BatchScanner {
    root: PathBuf,
    include: Option<glob::Pattern>,
}

impl BatchScanner {
    pub fn new(root: PathBuf, include: Option<&str>) -> Result<Self> {
        let include = include
            .map(glob::Pattern::new)
            .transpose()
            .context("Invalid include pattern")?;
        Ok(Self { root, include })
    }

    /// Media files inside the root's immediate subdirectories, sorted by name
    pub fn scan(&self) -> Result<Vec<SubmittedFile>> {
        if !self.root.is_dir() {
            return Err(anyhow!("Root is not a directory: {:?}", self.root));
        }

        info!("🔎 Scanning for media files under {:?}", self.root);

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if !is_media_file(entry.path()) {
                debug!("Skipping non-media file: {:?}", entry.path());
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!("⚠️ SKIPPING: File name is not valid UTF-8: {:?}", entry.path());
                continue;
            };
            if let Some(pattern) = &self.include {
                if !pattern.matches(&name) {
                    debug!("Excluded by include pattern: {}", name);
                    continue;
                }
            }

            let size = entry.metadata().ok().map(|m| m.len());
            files.push(SubmittedFile::new(name, size));
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        info!("Found {} media file(s)", files.len());
        Ok(files)
    }
}

pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Turn explicit file arguments into a batch. Only the file name is kept;
/// the size is read when the path exists. Names that are not valid UTF-8
/// are skipped.
pub fn submitted_from_paths(paths: &[PathBuf]) -> Vec<SubmittedFile> {
    paths
        .iter()
        .filter_map(|path| {
            let Some(name) = path.file_name()?.to_str() else {
                warn!("⚠️ SKIPPING: File name is not valid UTF-8: {:?}", path);
                return None;
            };
            let size = std::fs::metadata(path).ok().map(|m| m.len());
            Some(SubmittedFile::new(name, size))
        })
        .collect()
}
