//! Core data types, enums, and reports for the Folio library.
//!
//! This module defines the fundamental data structures used throughout Folio:
//! - The display language selector (`Language`)
//! - Parsed, dual-language metadata (`ParsedWork`, `LocalizedFields`)
//! - The flattened, single-language record handed to renderers (`WorkRecord`)
//! - Media references and numbering conventions (`MediaRef`, `MediaKind`, `NumberingStyle`)
//! - Reporting types (`DiscoveryReport`)

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Display language of a projected record.
///
/// Japanese is the primary language of the metadata files, English the secondary one.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum Language {
    #[default]
    Japanese,
    English,
}

impl Language {
    /// Picks a language from a locale tag such as `en-US` or `ja-JP`.
    /// Any English locale maps to English, everything else to Japanese.
    pub fn from_locale(locale: &str) -> Self {
        if locale.trim().to_ascii_lowercase().starts_with("en") {
            Language::English
        } else {
            Language::Japanese
        }
    }

    /// Short language code used for storage keys and URLs.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::English => "en",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Language::Japanese => Language::English,
            Language::English => Language::Japanese,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "jp" | "japanese" | "日本語" => Ok(Language::Japanese),
            "en" | "english" => Ok(Language::English),
            other => Err(Error::Other(format!("Unknown language: {}", other))),
        }
    }
}

/// Role the author played on a work.
///
/// Known roles are matched case-insensitively against both their slug
/// (`art-director`) and display form (`Art Director`); anything else is kept verbatim.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum Role {
    Designer,
    ArtDirector,
    Illustrator,
    Engineer,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "designer" => Role::Designer,
            "art-director" | "artdirector" => Role::ArtDirector,
            "illustrator" => Role::Illustrator,
            "engineer" => Role::Engineer,
            _ => Role::Other(raw.trim().to_string()),
        }
    }

    /// Slug form as written in metadata files.
    pub fn slug(&self) -> &str {
        match self {
            Role::Designer => "designer",
            Role::ArtDirector => "art-director",
            Role::Illustrator => "illustrator",
            Role::Engineer => "engineer",
            Role::Other(raw) => raw,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Role::Designer => "Designer",
            Role::ArtDirector => "Art Director",
            Role::Illustrator => "Illustrator",
            Role::Engineer => "Engineer",
            Role::Other(raw) => raw,
        }
    }

    /// Tooltip text explaining the role. Unknown roles share the art director text.
    pub fn description(&self, language: Language) -> &'static str {
        match (self, language) {
            (Role::Designer, Language::Japanese) => {
                "アートディレクターの示す方向性をもとに、手を動かしてアウトプットを制作する役割。"
            }
            (Role::Designer, Language::English) => {
                "Creates the actual output based on the direction set by the art director."
            }
            (Role::Illustrator, Language::Japanese) => "キャラクターやイラスト表現を制作する役割。",
            (Role::Illustrator, Language::English) => {
                "Creates characters and illustrative expressions."
            }
            (Role::Engineer, Language::Japanese) => "デザインや要件を受けて、実装を担当する役割。",
            (Role::Engineer, Language::English) => {
                "Implements the design and requirements as working software."
            }
            (Role::ArtDirector | Role::Other(_), Language::Japanese) => {
                "クライアントと直接やり取りをしながら、案件の進行に関わりつつ、デザインのクオリティを保証する役割。多くの案件で自身も手を動かす。"
            }
            (Role::ArtDirector | Role::Other(_), Language::English) => {
                "Works directly with clients, drives the project and guarantees design quality. Often hands-on as well."
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Language-specific block of a metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct LocalizedFields {
    pub client: String,
    pub title: String,
    pub description: String,
    /// Legacy per-language role line. Only used when the common block has no role.
    pub role: Option<String>,
}

/// Parsed, dual-language content of one metadata file.
///
/// Produced by [`parse_work_text`](crate::parser::parse_work_text). Keep this
/// around to re-project a record when the display language changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct ParsedWork {
    /// Explicit `ID:` value. `None` when the file declares no id.
    pub id: Option<String>,
    /// Positive priority. `None` when absent, malformed or not positive.
    pub priority: Option<u32>,
    /// Common role, shared by both languages.
    pub role: Option<String>,
    /// Tags are authored once in the common block and shared by both languages.
    pub tags: Vec<String>,
    pub japanese: LocalizedFields,
    pub english: LocalizedFields,
}

impl ParsedWork {
    pub fn localized(&self, language: Language) -> &LocalizedFields {
        match language {
            Language::Japanese => &self.japanese,
            Language::English => &self.english,
        }
    }

    pub(crate) fn localized_mut(&mut self, language: Language) -> &mut LocalizedFields {
        match language {
            Language::Japanese => &mut self.japanese,
            Language::English => &mut self.english,
        }
    }
}

/// A single-language work record, ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct WorkRecord {
    /// Unique within a collection. Empty only for records projected outside discovery
    /// from a file without an `ID:` line.
    pub id: String,
    pub priority: Option<u32>,
    pub client: String,
    pub title: String,
    pub description: String,
    pub role: Option<Role>,
    pub tags: Vec<String>,
    /// Folder name holding the metadata file and the media.
    pub storage_location: Option<String>,
    /// Filled by [`Folio::load_media`](crate::folio::Folio::load_media); empty until then.
    pub media: Vec<MediaRef>,
    pub language: Language,
}

impl WorkRecord {
    /// Featured works are the ones with a positive priority.
    pub fn is_featured(&self) -> bool {
        self.priority.is_some()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Whether a media file is a still image or a video.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum MediaKind {
    Image,
    Video,
}

/// Reference to one media file of a work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct MediaRef {
    pub location: String,
    pub file_name: String,
    pub ordinal: u32,
    pub kind: MediaKind,
}

impl MediaRef {
    /// Path relative to the source root, e.g. `works-3/01.webp`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.location, self.file_name)
    }
}

/// Media file numbering convention.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum NumberingStyle {
    /// `1.png`, `2.png`, ...
    SingleDigit,
    /// `01.png`, `02.png`, ...
    #[default]
    TwoDigit,
}

impl NumberingStyle {
    pub fn format(&self, ordinal: u32) -> String {
        match self {
            NumberingStyle::SingleDigit => ordinal.to_string(),
            NumberingStyle::TwoDigit => format!("{:02}", ordinal),
        }
    }

    pub fn other(&self) -> Self {
        match self {
            NumberingStyle::SingleDigit => NumberingStyle::TwoDigit,
            NumberingStyle::TwoDigit => NumberingStyle::SingleDigit,
        }
    }
}

/// How a location was found during a discovery pass.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum DiscoveryStrategy {
    /// Generated from a bounded integer range.
    Numeric,
    /// Found in the directory listing of the source root.
    Named,
}

/// Filter applied to a catalog of records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

/// Summary of one discovery pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiscoveryReport {
    pub numeric_locations_probed: usize,
    pub numeric_locations_found: usize,
    /// `None` when the root listing was unavailable (or named discovery is disabled).
    pub named_locations_listed: Option<usize>,
    pub named_locations_found: usize,
    pub records_kept: usize,
    /// Ids dropped because an earlier location already claimed them.
    pub duplicate_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DiscoveryReport {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            numeric_locations_probed: 0,
            numeric_locations_found: 0,
            named_locations_listed: None,
            named_locations_found: 0,
            records_kept: 0,
            duplicate_ids: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// True when no strategy yielded a single record.
    pub fn is_empty(&self) -> bool {
        self.records_kept == 0
    }
}

/// Where a [`Folio`](crate::folio::Folio) reads its works from.
/// Used by [`FolioConfig::preflight_check`](crate::folio::FolioConfig::preflight_check).
#[derive(Debug, Clone, PartialEq)]
pub enum SourceTarget {
    /// Base URL of the folder that holds the work locations, e.g. `https://example.com/images/`.
    Http(String),
    /// Local directory that holds the work locations.
    Dir(PathBuf),
}
