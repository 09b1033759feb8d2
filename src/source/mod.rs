//! Storage backends a portfolio can be read from.
//!
//! This module contains the common interface for work sources and the
//! implementations for static HTTP hosting and local directories.
//! All paths handed to a source are relative to its root, e.g. `works-3/0.txt`.

use crate::error::Result;
use async_trait::async_trait;

pub mod dir;
pub mod http;

pub use dir::DirSource;
pub use http::HttpSource;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Entry name without any trailing `/`.
    pub name: String,
    pub is_dir: bool,
}

impl ListingEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Common interface for everything Folio can read works from.
///
/// Implementations report failures as errors; callers in the discovery core
/// treat every error the same way as "absent".
#[async_trait]
pub trait WorkSource: Send + Sync {
    /// Reads a text file.
    ///
    /// # Parameters
    /// * `path` - File path relative to the source root
    ///
    /// # Returns
    /// * `Result<String>` - The file content, or an error when it is missing or unreadable
    async fn fetch_text(&self, path: &str) -> Result<String>;

    /// Checks whether a file exists.
    ///
    /// # Parameters
    /// * `path` - File path relative to the source root
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Lists the entries of a directory.
    ///
    /// # Parameters
    /// * `dir` - Directory path relative to the source root; empty for the root itself
    ///
    /// # Returns
    /// * `Ok(Some(entries))` - The listing
    /// * `Ok(None)` - The source cannot list this directory
    /// * `Err(Error)` - The listing request failed
    async fn list(&self, dir: &str) -> Result<Option<Vec<ListingEntry>>>;

    /// Human readable description of the source root, for logs.
    fn describe(&self) -> String;
}
