//! Custom error types and result handling for Folio operations.
//!
//! This module defines the error handling system used at the edges of Folio:
//! configuration, source construction and the raw [`WorkSource`](crate::source::WorkSource)
//! calls. The parsing and discovery core never hands these to its callers; it
//! collapses them into "absent" and logs them instead.
//!
use std::path::PathBuf;

/// Type alias for Results with Folio errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all Folio operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    FolioBuilder(#[from] crate::folio::FolioConfigBuilderError),
    /// Error for a directory source path that cannot be used
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for an HTTP base URL that cannot be parsed or joined
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, String),
    /// Error for a folder name that does not follow the location naming convention
    #[error("Invalid location name: {0}")]
    InvalidLocation(String),
    /// Non-success HTTP status for a requested resource
    #[error("Request for '{1}' returned status {0}")]
    Status(u16, String),
    /// Error for resources that couldn't be found (e.g., metadata file, media file)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns true when the error only means "the resource is not there".
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Status(code, _) => *code == 404 || *code == 410,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
