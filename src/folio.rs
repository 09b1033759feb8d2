use futures::stream::{self, StreamExt};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

use crate::discovery::{Discovery, DiscoveryPass};
use crate::error::{Error, Result};
use crate::naming::Location;
use crate::source::http::DEFAULT_REQUEST_TIMEOUT;
use crate::source::{DirSource, HttpSource, WorkSource};
use crate::types::{Language, MediaRef, NumberingStyle, SourceTarget, WorkRecord};

/// Metadata file names tried, in order, inside each work location.
pub const DEFAULT_METADATA_FILE_NAMES: &[&str] = &["0.txt", "名称未設定.txt", "info.txt", "work.txt"];
/// Image extensions in priority order: the preferred format first.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["webp", "png", "jpg", "jpeg", "gif", "svg"];
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
/// Probes in flight per CPU.
const PROBES_PER_CPU: usize = 4;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_concurrency() -> usize {
    (num_cpus::get() * PROBES_PER_CPU).max(1)
}

/// The Folio configuration, built declaratively using the builder pattern.
///
/// This struct holds the naming conventions and probing bounds used to find
/// works in a source. The display language is not part of it: every
/// projection takes the language as an argument.
///
/// ## Builder Pattern
///
/// Use [`FolioConfig::builder()`](FolioConfig::builder) to create a new configuration:
///
/// ```rust,no_run
/// # use folio::prelude::*;
/// let config = FolioConfig::builder()
///     .location_prefix("works-")
///     .numeric_probe_limit(20u32)
///     .max_consecutive_misses(2u32)
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(
    setter(into, strip_option),
    build_fn(name = "build_unchecked", private, validate = "Self::validate")
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FolioConfig {
    // --- Location naming ---
    /// Folder name prefix shared by all work locations, e.g. `works-` for `works-3`.
    #[builder(default = "\"works-\".to_string()")]
    pub location_prefix: String,

    /// Highest number tried by numeric probing (`<prefix>1` ..= `<prefix>N`).
    #[builder(default = "20")]
    pub numeric_probe_limit: u32,

    /// Whether to list the source root for named (slug) locations.
    #[builder(default = "true")]
    pub discover_named_locations: bool,

    /// Custom regex for recognizing named locations in the root listing.
    ///
    /// If not provided, folder names must start with [`location_prefix`](FolioConfig::location_prefix).
    /// The first capture group, when present, is used as the location suffix.
    ///
    /// Example: `r"^project_(.+)$"` to match "project_7", "project_rebrand"
    #[builder(default)]
    pub named_location_regex_str: Option<String>,

    // --- Metadata ---
    /// File names tried, in order, for a location's metadata document.
    #[builder(default = "strings(DEFAULT_METADATA_FILE_NAMES)")]
    pub metadata_file_names: Vec<String>,

    // --- Media resolution ---
    /// Image extensions in priority order.
    #[builder(default = "strings(DEFAULT_IMAGE_EXTENSIONS)")]
    pub image_extensions: Vec<String>,

    /// Video extensions, tried after the images when [`include_video`](FolioConfig::include_video) is set.
    #[builder(default = "strings(DEFAULT_VIDEO_EXTENSIONS)")]
    pub video_extensions: Vec<String>,

    #[builder(default = "false")]
    pub include_video: bool,

    /// Highest media ordinal looked at.
    #[builder(default = "10")]
    pub max_media_ordinal: u32,

    /// Number of missing ordinals in a row that ends a media walk.
    /// `1` stops at the first gap.
    #[builder(default = "1")]
    pub max_consecutive_misses: u32,

    /// Numbering style tried first; the other one is the fallback.
    #[builder(default = "NumberingStyle::TwoDigit")]
    pub numbering_preference: NumberingStyle,

    /// Answer media existence checks from a directory listing when the source offers one.
    #[builder(default = "true")]
    pub use_listings: bool,

    // --- Transport ---
    /// Maximum number of locations probed at the same time.
    #[builder(default = "default_concurrency()")]
    pub max_concurrent_probes: usize,

    /// Per-request timeout for HTTP sources.
    #[builder(default = "DEFAULT_REQUEST_TIMEOUT")]
    pub request_timeout: Duration,

    /// Compiled regex from `named_location_regex_str`. Internal use only.
    #[builder(setter(skip), default)]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) compiled_named_location_regex: Option<Regex>,
}

impl std::fmt::Debug for FolioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolioConfig")
            .field("location_prefix", &self.location_prefix)
            .field("numeric_probe_limit", &self.numeric_probe_limit)
            .field("discover_named_locations", &self.discover_named_locations)
            .field("named_location_regex_str", &self.named_location_regex_str)
            .field("metadata_file_names", &self.metadata_file_names)
            .field("image_extensions", &self.image_extensions)
            .field("video_extensions", &self.video_extensions)
            .field("include_video", &self.include_video)
            .field("max_media_ordinal", &self.max_media_ordinal)
            .field("max_consecutive_misses", &self.max_consecutive_misses)
            .field("numbering_preference", &self.numbering_preference)
            .field("use_listings", &self.use_listings)
            .field("max_concurrent_probes", &self.max_concurrent_probes)
            .field("request_timeout", &self.request_timeout)
            // Skip compiled regex in debug output
            .finish()
    }
}

impl FolioConfig {
    /// Creates a new builder for configuring `FolioConfig`.
    pub fn builder() -> FolioConfigBuilder {
        FolioConfigBuilder::default()
    }

    /// Checks that a source target is usable with this configuration,
    /// without reading anything from it.
    ///
    /// * [`SourceTarget::Dir`] must be an existing directory.
    /// * [`SourceTarget::Http`] must be an `http`/`https` URL.
    pub fn preflight_check(&self, target: &SourceTarget) -> Result<&Self> {
        if self.location_prefix.is_empty() && self.compiled_named_location_regex.is_none() {
            return Err(Error::Other(
                "A location prefix or a named location regex is required".to_string(),
            ));
        }

        match target {
            SourceTarget::Dir(path) => {
                if path.as_os_str().is_empty() {
                    return Err(Error::Other("Source directory path is empty".to_string()));
                }
                if !path.exists() {
                    return Err(Error::NotFound(format!(
                        "Source directory does not exist: {:?}",
                        path
                    )));
                }
                if !path.is_dir() {
                    return Err(Error::InvalidPath(
                        path.clone(),
                        "Source path is not a directory.".to_string(),
                    ));
                }
            }
            SourceTarget::Http(url) => {
                crate::source::http::parse_base_url(url)?;
            }
        }

        Ok(self)
    }

    /// Opens the target with the matching backend.
    pub fn connect(self, target: SourceTarget) -> Result<Folio> {
        self.preflight_check(&target)?;
        let source: Arc<dyn WorkSource> = match target {
            SourceTarget::Http(url) => Arc::new(HttpSource::new(&url, self.request_timeout)?),
            SourceTarget::Dir(path) => Arc::new(DirSource::new(path)?),
        };
        log::debug!("Connected to {}", source.describe());
        Ok(Folio::new(self, source))
    }

    /// Uses an already constructed source, e.g. a custom backend.
    pub fn with_source(self, source: Arc<dyn WorkSource>) -> Folio {
        Folio::new(self, source)
    }
}

/// A configured portfolio source.
///
/// Every call is independent: nothing is cached between discovery passes,
/// and overlapping passes cannot interfere because the display language is
/// passed in rather than stored.
///
/// ```rust,no_run
/// # use folio::prelude::*;
/// # #[tokio::main]
/// # async fn main() -> folio::error::Result<()> {
/// let folio = FolioConfig::builder()
///     .build()?
///     .connect(SourceTarget::Http("https://example.com/images/".to_string()))?;
///
/// let pass = folio.discover().await;
/// let english = pass.project(Language::English);
/// let japanese = pass.project(Language::Japanese); // no refetch
/// println!("{} works ({} / {})", pass.works.len(), english.len(), japanese.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Folio {
    config: FolioConfig,
    source: Arc<dyn WorkSource>,
}

impl std::fmt::Debug for Folio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Folio")
            .field("config", &self.config)
            .field("source", &self.source.describe())
            .finish()
    }
}

impl Folio {
    pub fn new(config: FolioConfig, source: Arc<dyn WorkSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn WorkSource> {
        &self.source
    }

    fn discovery(&self) -> Discovery<'_> {
        Discovery::new(&self.config, Arc::clone(&self.source))
    }

    /// Runs a discovery pass and keeps the dual-language intermediates.
    pub async fn discover(&self) -> DiscoveryPass {
        self.discovery().run().await
    }

    /// Runs a discovery pass and projects every work for `language`.
    /// An empty result means nothing could be found.
    pub async fn discover_all(&self, language: Language) -> Vec<WorkRecord> {
        self.discover().await.project(language)
    }

    /// Runs a discovery pass and returns the work with the given id.
    pub async fn find_work(&self, id: &str, language: Language) -> Option<WorkRecord> {
        let pass = self.discover().await;
        let found = pass.find(id).map(|work| work.record(language));
        if found.is_none() {
            log::debug!("No work with id '{}'", id);
        }
        found
    }

    /// Reads a single location by folder name.
    pub async fn load_work(&self, folder_name: &str, language: Language) -> Option<WorkRecord> {
        let location = self.location(folder_name)?;
        self.discovery()
            .load(location)
            .await
            .map(|work| work.record(language))
    }

    /// Parses a folder name with this configuration's naming rules.
    /// Numbered folders always use the prefix form, so it is accepted even
    /// when a custom pattern is configured.
    pub fn location(&self, folder_name: &str) -> Option<Location> {
        self.config
            .compiled_named_location_regex
            .as_ref()
            .and_then(|regex| Location::from_match(regex, folder_name))
            .or_else(|| Location::parse(&self.config.location_prefix, folder_name).ok())
    }

    /// Resolves the media files of a location.
    pub async fn resolve_media(&self, location: &Location) -> Vec<MediaRef> {
        self.discovery().resolve_media(location).await
    }

    /// Resolves the thumbnail (first image) of a location.
    pub async fn resolve_thumbnail(&self, location: &Location) -> Option<MediaRef> {
        self.discovery().resolve_thumbnail(location).await
    }

    /// Fills in [`WorkRecord::media`] for each record that has a storage location.
    /// At most `max_concurrent_probes` locations are resolved at once; the walk
    /// inside each stays sequential.
    pub async fn load_media(&self, records: &mut [WorkRecord]) {
        let discovery = self.discovery();
        let locations: Vec<Option<Location>> = records
            .iter()
            .map(|r| r.storage_location.as_deref().and_then(|n| self.location(n)))
            .collect();

        let resolved: Vec<Vec<MediaRef>> = stream::iter(locations.iter().map(|location| {
            let discovery = &discovery;
            async move {
                match location {
                    Some(location) => discovery.resolve_media(location).await,
                    None => Vec::new(),
                }
            }
        }))
        .buffered(self.config.max_concurrent_probes)
        .collect()
        .await;

        for (record, media) in records.iter_mut().zip(resolved) {
            record.media = media;
        }
    }
}

impl FolioConfigBuilder {
    /// Builds the configuration, compiling the named location regex.
    pub fn build(&self) -> std::result::Result<FolioConfig, FolioConfigBuilderError> {
        let mut config = self.build_unchecked()?;
        if let Some(pattern) = &config.named_location_regex_str {
            let regex = Regex::new(pattern)
                .map_err(|e| FolioConfigBuilderError::ValidationError(e.to_string()))?;
            config.compiled_named_location_regex = Some(regex);
        }
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(Some(s)) = &self.named_location_regex_str {
            if Regex::new(s).is_err() {
                return Err(format!("Invalid named_location_regex: {}", s));
            }
        }
        if let Some(prefix) = &self.location_prefix {
            if prefix.is_empty() && !matches!(self.named_location_regex_str, Some(Some(_))) {
                return Err("location_prefix must not be empty".to_string());
            }
        }
        if let Some(names) = &self.metadata_file_names {
            if names.is_empty() {
                return Err("At least one metadata file name is required".to_string());
            }
        }
        if let Some(extensions) = &self.image_extensions {
            if extensions.is_empty() {
                return Err("At least one image extension is required".to_string());
            }
        }
        if self.max_media_ordinal == Some(0) {
            return Err("max_media_ordinal must be at least 1".to_string());
        }
        if self.max_consecutive_misses == Some(0) {
            return Err("max_consecutive_misses must be at least 1".to_string());
        }
        if self.max_concurrent_probes == Some(0) {
            return Err("max_concurrent_probes must be at least 1".to_string());
        }
        Ok(())
    }
}
