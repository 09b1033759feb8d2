//! Folio - Portfolio Work Discovery Library
//!
//! This crate finds the works of a portfolio stored as plain folders, either
//! on a static web server or on the local file system, and turns their
//! metadata files into display-ready records in Japanese or English.
//!
//! # Getting Started
//!
//! Configure the naming conventions with the `FolioConfig` builder, connect it
//! to a source and run a discovery pass. The pass keeps both languages, so
//! switching the display language never refetches anything.
//!
//! ```rust,no_run
//! use folio::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> folio::error::Result<()> {
//!     // 1. Configure how work folders and media files are named
//!     let config = FolioConfig::builder()
//!         .location_prefix("works-")
//!         .numeric_probe_limit(20u32)
//!         .build()?;
//!
//!     // Optional: check the target before touching it
//!     let target = SourceTarget::Http("https://example.com/images/".to_string());
//!     config.preflight_check(&target)?;
//!
//!     // 2. Discover every work once
//!     let folio = config.connect(target)?;
//!     let pass = folio.discover().await;
//!
//!     // 3. Project for a language and query the catalog
//!     let mut records = pass.project(Language::English);
//!     folio.load_media(&mut records).await;
//!     let catalog = Catalog::new(records);
//!     for work in catalog.featured() {
//!         println!("{} - {} ({} media)", work.id, work.title, work.media.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! The metadata format itself is documented in [`parser`].

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod folio;
pub mod naming;
pub mod parser;
pub mod source;
pub mod types;

// Publicly expose the main `FolioConfig` struct and its builder
pub use folio::{Folio, FolioConfig, FolioConfigBuilder};

// Re-export error and core types for direct access
pub use catalog::{Catalog, translate_tag};
pub use discovery::{DiscoveredWork, DiscoveryPass};
pub use naming::Location;
pub use parser::parse_work_text;
pub use source::{DirSource, HttpSource, ListingEntry, WorkSource};
pub use types::{
    DiscoveryReport, DiscoveryStrategy, Language, LocalizedFields, MediaKind, MediaRef,
    NumberingStyle, ParsedWork, Role, SourceTarget, TagFilter, WorkRecord,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use folio::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        Catalog, DiscoveredWork, DiscoveryPass, DiscoveryReport, DiscoveryStrategy, Language,
        Location, MediaKind, MediaRef, NumberingStyle, ParsedWork, Role, SourceTarget, TagFilter,
        WorkRecord, parse_work_text, translate_tag,
    };
    pub use super::{DirSource, HttpSource, ListingEntry, WorkSource};
    pub use super::{Folio, FolioConfig, FolioConfigBuilder};
    pub use regex::Regex;
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
}
