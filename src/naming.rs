//! Naming conventions for work locations and media files.
//!
//! Work folders are named `<prefix><number>` (e.g. `works-3`) or
//! `<prefix><slug>` (e.g. `works-brand-refresh`). Media files inside a folder
//! are named by ordinal, either `1.png` or zero-padded `01.png`.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::NumberingStyle;

lazy_static! {
    /// Matches media file names of the form `<digits>.<ext>` and captures both parts.
    pub static ref MEDIA_FILE_REGEX: Regex = Regex::new(r"^(\d+)\.([A-Za-z0-9]+)$").unwrap();
    /// Default Regex for extracting the first number in a name, used for ordering.
    pub static ref DEFAULT_NUMBER_REGEX: Regex = Regex::new(r"\d+").unwrap();
}

/// Suffix part of a location name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Numbered(u32),
    Named(String),
}

/// A folder holding one work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    name: String,
    kind: LocationKind,
}

impl Location {
    pub fn numbered(prefix: &str, number: u32) -> Self {
        Self {
            name: format!("{}{}", prefix, number),
            kind: LocationKind::Numbered(number),
        }
    }

    /// Parses a folder name against the prefix convention.
    ///
    /// A trailing `/` (as found in directory listings) is ignored. Returns
    /// [`Error::InvalidLocation`] when the name lacks the prefix or a suffix.
    pub fn parse(prefix: &str, folder_name: &str) -> Result<Self> {
        let name = folder_name.trim().trim_end_matches('/');
        let suffix = name
            .strip_prefix(prefix)
            .filter(|s| !s.is_empty() && !s.contains('/'))
            .ok_or_else(|| Error::InvalidLocation(folder_name.to_string()))?;

        let kind = if suffix.bytes().all(|b| b.is_ascii_digit()) {
            match suffix.parse::<u32>() {
                Ok(number) => LocationKind::Numbered(number),
                Err(_) => LocationKind::Named(suffix.to_string()),
            }
        } else {
            LocationKind::Named(suffix.to_string())
        };

        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }

    /// Builds a location from a folder name matched by a custom pattern.
    /// The first capture group, when present, is used as the suffix.
    pub fn from_match(regex: &Regex, folder_name: &str) -> Option<Self> {
        let name = folder_name.trim().trim_end_matches('/');
        let caps = regex.captures(name)?;
        let suffix = caps.get(1).or_else(|| caps.get(0))?.as_str();
        let kind = match suffix.parse::<u32>() {
            Ok(number) if suffix.bytes().all(|b| b.is_ascii_digit()) => {
                LocationKind::Numbered(number)
            }
            _ => LocationKind::Named(suffix.to_string()),
        };
        Some(Self {
            name: name.to_string(),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &LocationKind {
        &self.kind
    }

    pub fn number(&self) -> Option<u32> {
        match self.kind {
            LocationKind::Numbered(n) => Some(n),
            LocationKind::Named(_) => None,
        }
    }

    /// Id used when the metadata file declares none: the number for numbered
    /// folders, the whole folder name otherwise.
    pub fn fallback_id(&self) -> String {
        match &self.kind {
            LocationKind::Numbered(n) => n.to_string(),
            LocationKind::Named(_) => self.name.clone(),
        }
    }

    /// Path of a file inside this location, relative to the source root.
    pub fn file_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.name, file_name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Name of the media file for `ordinal` in the given numbering style.
pub fn media_file_name(style: NumberingStyle, ordinal: u32, extension: &str) -> String {
    format!("{}.{}", style.format(ordinal), extension)
}

/// A media file name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFileName {
    pub ordinal: u32,
    pub style: NumberingStyle,
    pub extension: String,
}

/// Parses `01.webp` / `1.webp` style names. Names that could belong to neither
/// style (e.g. `001.png`, `0.txt`) are rejected.
pub fn parse_media_file_name(file_name: &str) -> Option<MediaFileName> {
    let caps = MEDIA_FILE_REGEX.captures(file_name)?;
    let digits = caps.get(1)?.as_str();
    let extension = caps.get(2)?.as_str().to_ascii_lowercase();
    let ordinal = digits.parse::<u32>().ok().filter(|n| *n > 0)?;

    let style = if digits.len() == 1 {
        NumberingStyle::SingleDigit
    } else if digits == format!("{:02}", ordinal) {
        NumberingStyle::TwoDigit
    } else if digits == ordinal.to_string() {
        NumberingStyle::SingleDigit
    } else {
        return None;
    };

    Some(MediaFileName {
        ordinal,
        style,
        extension,
    })
}

/// Extracts the first number found in a name.
pub fn extract_number(name: &str) -> Option<u32> {
    DEFAULT_NUMBER_REGEX
        .find(name)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Orders names by their first number, falling back to plain string order.
pub fn compare_by_number(a: &str, b: &str) -> std::cmp::Ordering {
    extract_number(a)
        .cmp(&extract_number(b))
        .then_with(|| a.cmp(b))
}

/// Checks if a name starts with a dot (hidden entry).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
