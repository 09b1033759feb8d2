//! Work discovery: finding work locations, reading their metadata and
//! resolving their media files.
//!
//! Locations are found two ways, and the results merged by id:
//! 1. **Numeric probing**: `<prefix>1` .. `<prefix>N` are tried directly.
//! 2. **Named discovery**: the source root is listed and every folder that
//!    follows the naming convention is tried.
//!
//! Every failure (missing file, non-success status, transport error) counts
//! as "absent". Discovery never fails; an empty pass is the only failure signal.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use regex::Regex;
use tokio::spawn;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::folio::FolioConfig;
use crate::naming::{Location, media_file_name, parse_media_file_name};
use crate::parser::parse_work_text;
use crate::source::WorkSource;
use crate::types::{
    DiscoveryReport, DiscoveryStrategy, Language, MediaKind, MediaRef, NumberingStyle, ParsedWork,
    WorkRecord,
};

/// A location whose metadata file was found and parsed.
///
/// Holds the dual-language intermediate so the record can be re-projected
/// for another language without fetching anything again.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredWork {
    pub location: Location,
    pub strategy: DiscoveryStrategy,
    pub parsed: ParsedWork,
}

impl DiscoveredWork {
    /// The explicit id, or the one derived from the location name.
    pub fn id(&self) -> String {
        self.parsed
            .id
            .clone()
            .unwrap_or_else(|| self.location.fallback_id())
    }

    pub fn record(&self, language: Language) -> WorkRecord {
        let mut record = self.parsed.project(language);
        record.id = self.id();
        record.storage_location = Some(self.location.name().to_string());
        record
    }
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryPass {
    /// Works in discovery order, unique by id.
    pub works: Vec<DiscoveredWork>,
    pub report: DiscoveryReport,
}

impl DiscoveryPass {
    /// Flattens every work for the given display language.
    pub fn project(&self, language: Language) -> Vec<WorkRecord> {
        self.works.iter().map(|w| w.record(language)).collect()
    }

    pub fn find(&self, id: &str) -> Option<&DiscoveredWork> {
        self.works.iter().find(|w| w.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }
}

/// How existence questions are answered for one location.
enum Existence {
    /// Names taken from a directory listing.
    Listing(HashSet<String>),
    /// One request per candidate file.
    Probe,
}

/// Runs discovery against one source with one configuration.
pub struct Discovery<'a> {
    config: &'a FolioConfig,
    source: Arc<dyn WorkSource>,
    named_location_regex: Option<&'a Regex>,
}

impl<'a> Discovery<'a> {
    /// Creates a new Discovery instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration (naming, probing bounds, extensions)
    /// * `source` - Where locations and files are read from
    pub fn new(config: &'a FolioConfig, source: Arc<dyn WorkSource>) -> Self {
        Self {
            config,
            source,
            named_location_regex: config.compiled_named_location_regex.as_ref(),
        }
    }

    /// Runs a full discovery pass.
    ///
    /// Numeric probing and the root listing run concurrently; the named
    /// locations are probed once the listing is in. Numeric results come
    /// first, so on an id collision the numbered folder wins.
    pub async fn run(&self) -> DiscoveryPass {
        let mut report = DiscoveryReport::start();

        let limit = self.config.numeric_probe_limit;
        let numeric_locations: Vec<(Location, DiscoveryStrategy)> = (1..=limit)
            .map(|n| {
                (
                    Location::numbered(&self.config.location_prefix, n),
                    DiscoveryStrategy::Numeric,
                )
            })
            .collect();
        report.numeric_locations_probed = numeric_locations.len();

        let (numeric_found, named_locations) = tokio::join!(
            self.probe_locations(numeric_locations),
            self.list_named_locations()
        );
        report.numeric_locations_found = numeric_found.len();

        let named_found = match named_locations {
            Some(locations) => {
                report.named_locations_listed = Some(locations.len());
                let candidates = locations
                    .into_iter()
                    .map(|l| (l, DiscoveryStrategy::Named))
                    .collect();
                self.probe_locations(candidates).await
            }
            None => Vec::new(),
        };
        report.named_locations_found = named_found.len();

        let mut works: Vec<DiscoveredWork> = Vec::new();
        let mut claimed: HashMap<String, String> = HashMap::new();
        for work in numeric_found.into_iter().chain(named_found) {
            let id = work.id();
            if let Some(owner) = claimed.get(&id) {
                if owner != work.location.name() {
                    log::warn!(
                        "Work id '{}' in '{}' is already used by '{}'; keeping the first one",
                        id,
                        work.location,
                        owner
                    );
                }
                report.duplicate_ids.push(id);
                continue;
            }
            claimed.insert(id, work.location.name().to_string());
            works.push(work);
        }

        report.records_kept = works.len();
        report.finished_at = chrono::Utc::now();
        log::info!(
            "Discovered {} works in {} ({} numbered, {} named, {} duplicates dropped)",
            report.records_kept,
            self.source.describe(),
            report.numeric_locations_found,
            report.named_locations_found,
            report.duplicate_ids.len()
        );

        DiscoveryPass { works, report }
    }

    /// Lists the source root and returns the locations that follow the naming
    /// convention. Folders numeric probing already tried are left out.
    /// `None` when named discovery is off or the root cannot be listed.
    pub async fn list_named_locations(&self) -> Option<Vec<Location>> {
        if !self.config.discover_named_locations {
            return None;
        }

        let entries = match self.source.list("").await {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                log::debug!("{} offers no root listing", self.source.describe());
                return None;
            }
            Err(e) => {
                log::debug!("Root listing of {} failed: {}", self.source.describe(), e);
                return None;
            }
        };

        let limit = self.config.numeric_probe_limit;
        let prefix = &self.config.location_prefix;
        let locations = entries
            .into_iter()
            .filter(|entry| entry.is_dir)
            .filter_map(|entry| self.location_from_name(&entry.name))
            // Skip the folders numeric probing already covers
            .filter(|location| match location.number() {
                Some(n) if (1..=limit).contains(&n) => {
                    location.name() != Location::numbered(prefix, n).name()
                }
                _ => true,
            })
            .collect();
        Some(locations)
    }

    fn location_from_name(&self, name: &str) -> Option<Location> {
        match self.named_location_regex {
            Some(regex) => Location::from_match(regex, name),
            None => Location::parse(&self.config.location_prefix, name).ok(),
        }
    }

    /// Fetches and parses the metadata of every location concurrently,
    /// keeping the input order and dropping the locations without metadata.
    pub async fn probe_locations(
        &self,
        locations: Vec<(Location, DiscoveryStrategy)>,
    ) -> Vec<DiscoveredWork> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_probes));
        let file_names: Arc<[String]> = self.config.metadata_file_names.clone().into();
        let mut handles: Vec<JoinHandle<Option<DiscoveredWork>>> = Vec::new();

        for (location, strategy) in locations {
            let semaphore = Arc::clone(&semaphore);
            let source = Arc::clone(&self.source);
            let file_names = Arc::clone(&file_names);

            handles.push(spawn(async move {
                let _permit = semaphore.acquire().await.ok()?;
                let text = fetch_metadata(source.as_ref(), &location, &file_names).await?;
                Some(DiscoveredWork {
                    location,
                    strategy,
                    parsed: parse_work_text(&text),
                })
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Metadata probe task failed: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Reads and parses the metadata of a single location.
    pub async fn load(&self, location: Location) -> Option<DiscoveredWork> {
        let text = fetch_metadata(
            self.source.as_ref(),
            &location,
            &self.config.metadata_file_names,
        )
        .await?;
        let strategy = match location.number() {
            Some(_) => DiscoveryStrategy::Numeric,
            None => DiscoveryStrategy::Named,
        };
        Some(DiscoveredWork {
            location,
            strategy,
            parsed: parse_work_text(&text),
        })
    }

    /// Resolves the media files of a location, in ordinal order.
    ///
    /// The preferred numbering style is walked first; when it yields nothing
    /// the other style is tried. A walk stops after
    /// `max_consecutive_misses` ordinals in a row have no file.
    pub async fn resolve_media(&self, location: &Location) -> Vec<MediaRef> {
        let extensions = self.media_extensions(self.config.include_video);
        let existence = self.existence_for(location).await;
        let preferred = self.config.numbering_preference;

        let found = self
            .walk_ordinals(location, preferred, &extensions, &existence)
            .await;
        if !found.is_empty() {
            return found;
        }
        log::debug!(
            "No {:?} media in '{}', trying {:?}",
            preferred,
            location,
            preferred.other()
        );
        self.walk_ordinals(location, preferred.other(), &extensions, &existence)
            .await
    }

    /// Finds the first image of a location, trying `1.<ext>` before `01.<ext>`.
    pub async fn resolve_thumbnail(&self, location: &Location) -> Option<MediaRef> {
        let extensions = self.media_extensions(false);
        let existence = self.existence_for(location).await;
        for style in [NumberingStyle::SingleDigit, NumberingStyle::TwoDigit] {
            if let Some(found) = self
                .first_existing(location, style, 1, &extensions, &existence)
                .await
            {
                return Some(found);
            }
        }
        log::debug!("No thumbnail in '{}'", location);
        None
    }

    fn media_extensions(&self, include_video: bool) -> Vec<(String, MediaKind)> {
        let images = self
            .config
            .image_extensions
            .iter()
            .map(|e| (e.clone(), MediaKind::Image));
        let videos = self
            .config
            .video_extensions
            .iter()
            .filter(|_| include_video)
            .map(|e| (e.clone(), MediaKind::Video));
        images.chain(videos).collect()
    }

    async fn existence_for(&self, location: &Location) -> Existence {
        if !self.config.use_listings {
            return Existence::Probe;
        }
        match self.source.list(location.name()).await {
            Ok(Some(entries)) => {
                let names: HashSet<String> = entries
                    .into_iter()
                    .filter(|e| !e.is_dir && parse_media_file_name(&e.name).is_some())
                    .map(|e| e.name)
                    .collect();
                // A listing without media names proves nothing about the files
                if names.is_empty() {
                    log::debug!("Listing of '{}' has no media names, probing instead", location);
                    Existence::Probe
                } else {
                    Existence::Listing(names)
                }
            }
            Ok(None) => Existence::Probe,
            Err(e) => {
                log::debug!("Listing of '{}' failed, probing instead: {}", location, e);
                Existence::Probe
            }
        }
    }

    async fn walk_ordinals(
        &self,
        location: &Location,
        style: NumberingStyle,
        extensions: &[(String, MediaKind)],
        existence: &Existence,
    ) -> Vec<MediaRef> {
        let mut found: Vec<MediaRef> = Vec::new();
        let mut misses: u32 = 0;

        // Ordinals are checked one after another: a gap ends the walk
        for ordinal in 1..=self.config.max_media_ordinal {
            match self
                .first_existing(location, style, ordinal, extensions, existence)
                .await
            {
                Some(media) => {
                    found.push(media);
                    misses = 0;
                }
                None => {
                    misses += 1;
                    if misses >= self.config.max_consecutive_misses {
                        log::debug!(
                            "Stopping media walk in '{}' after {} consecutive misses at ordinal {}",
                            location,
                            misses,
                            ordinal
                        );
                        break;
                    }
                }
            }
        }

        found
    }

    /// Checks every extension of one ordinal and returns the highest-priority hit.
    async fn first_existing(
        &self,
        location: &Location,
        style: NumberingStyle,
        ordinal: u32,
        extensions: &[(String, MediaKind)],
        existence: &Existence,
    ) -> Option<MediaRef> {
        let candidates: Vec<(String, MediaKind)> = extensions
            .iter()
            .map(|(ext, kind)| (media_file_name(style, ordinal, ext), *kind))
            .collect();

        let hits: Vec<bool> = match existence {
            Existence::Listing(names) => candidates
                .iter()
                .map(|(name, _)| names.contains(name))
                .collect(),
            Existence::Probe => {
                let probes = candidates.iter().map(|(name, _)| {
                    let path = location.file_path(name);
                    let source = Arc::clone(&self.source);
                    async move {
                        match source.exists(&path).await {
                            Ok(exists) => exists,
                            Err(e) => {
                                log::debug!("Probe of '{}' failed: {}", path, e);
                                false
                            }
                        }
                    }
                });
                join_all(probes).await
            }
        };

        candidates
            .into_iter()
            .zip(hits)
            .find(|(_, hit)| *hit)
            .map(|((file_name, kind), _)| MediaRef {
                location: location.name().to_string(),
                file_name,
                ordinal,
                kind,
            })
    }
}

/// Tries each metadata file name in order and returns the first readable one.
pub async fn fetch_metadata(
    source: &dyn WorkSource,
    location: &Location,
    file_names: &[String],
) -> Option<String> {
    for file_name in file_names {
        let path = location.file_path(file_name);
        match source.fetch_text(&path).await {
            Ok(text) => {
                log::debug!("Read metadata '{}'", path);
                return Some(text);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => log::debug!("Reading '{}' failed: {}", path, e),
        }
    }
    log::debug!("No metadata file in '{}'", location);
    None
}
