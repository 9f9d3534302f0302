//! Source directory scanning

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};

/// A document file found in the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDocument {
    /// Path relative to the source directory, with `/` separators
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
}

/// Lazy, name-ordered iterator over matching documents
pub struct DocumentDiscovery {
    root: PathBuf,
    walker: walkdir::IntoIter,
    extraction: ExtractionConfig,
}

impl DocumentDiscovery {
    /// Start scanning `root` for documents matching the extraction settings
    pub fn new(root: &Path, extraction: &ExtractionConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotFound(root.to_path_buf()));
        }

        let max_depth = if extraction.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Ok(Self {
            root: root.to_path_buf(),
            walker,
            extraction: extraction.clone(),
        })
    }

    fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Iterator for DocumentDiscovery {
    type Item = DiscoveredDocument;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry during discovery: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.extraction.matches(entry.path()) {
                continue;
            }

            let path = entry.into_path();
            return Some(DiscoveredDocument {
                name: self.relative_name(&path),
                path,
            });
        }
    }
}
