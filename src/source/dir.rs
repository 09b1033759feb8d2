//! Local directory backend.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{ReadDir, read_dir};

use super::{ListingEntry, WorkSource};
use crate::error::{Error, Result};
use crate::naming::{compare_by_number, is_hidden};

/// Reads works from a folder on the local file system, e.g. the `images/`
/// folder of a checked-out site.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Creates a source rooted at `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(Error::NotFound(format!(
                "Source directory does not exist: {:?}",
                root
            )));
        }
        if !root.is_dir() {
            return Err(Error::InvalidPath(
                root,
                "Source path is not a directory.".to_string(),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a relative path onto the root, refusing anything that would escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::InvalidPath(
                relative.to_path_buf(),
                "Path must stay inside the source directory".to_string(),
            ));
        }
        Ok(self.root.join(relative))
    }
}

fn map_io(path: &str, error: std::io::Error) -> Error {
    if error.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(path.to_string())
    } else {
        Error::Io(error)
    }
}

#[async_trait]
impl WorkSource for DirSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path)?;
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| map_io(path, e))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.resolve(path)?;
        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<ListingEntry>>> {
        let full_path = self.resolve(dir)?;
        let mut paths: ReadDir = read_dir(&full_path).await.map_err(|e| map_io(dir, e))?;
        let mut entries: Vec<ListingEntry> = Vec::new();

        while let Some(entry) = paths.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_hidden(&name) {
                continue;
            }
            let is_dir = entry.file_type().await?.is_dir();
            entries.push(ListingEntry { name, is_dir });
        }

        // read_dir order is platform dependent; `works-10` sorts after `works-9`
        entries.sort_by(|a, b| compare_by_number(&a.name, &b.name));
        Ok(Some(entries))
    }

    fn describe(&self) -> String {
        format!("directory {:?}", self.root)
    }
}
