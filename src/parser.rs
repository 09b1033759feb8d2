//! Metadata file parser.
//!
//! A work's metadata file is a small, line-oriented document split into
//! sections by `--- <name> ---` header lines:
//!
//! ```text
//! --- 共通 ---
//! ID: alpha
//! Priority: 2
//! Role: designer
//! タグ: ロゴ, ブランディング
//!
//! --- 日本語 ---
//! クライアント: アクメ社
//! 作品名: アルファ
//! 紹介文: リデザインの取り組み。
//!
//! --- English ---
//! Client: Acme Co
//! Title: Alpha Project
//! Description: A redesign effort.
//! ```
//!
//! Parsing is pure and infallible: unknown sections are skipped, malformed
//! values become unset fields, and an empty document yields an empty
//! [`ParsedWork`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Language, ParsedWork, Role, WorkRecord};

lazy_static! {
    /// Matches section header lines such as `--- English ---` and captures the section name.
    /// A bare `---` matches too (with an empty name) and closes the current section.
    pub static ref SECTION_HEADER_REGEX: Regex = Regex::new(r"^-{3,}\s*(.*?)\s*-*$").unwrap();
}

/// Names accepted for the common section header.
pub const COMMON_MARKERS: &[&str] = &["共通", "common", "Common"];
/// Names accepted for the Japanese section header.
pub const JAPANESE_MARKERS: &[&str] = &["日本語", "Japanese"];
/// Names accepted for the English section header.
pub const ENGLISH_MARKERS: &[&str] = &["English"];

pub const ID_LABEL: &str = "ID:";
pub const PRIORITY_LABEL: &str = "Priority:";
pub const ROLE_LABEL: &str = "Role:";
pub const TAG_LABELS: &[&str] = &["タグ:", "Tags:"];

/// Lines starting with these are editorial notes, never description text.
pub const NOTE_PREFIXES: &[&str] = &["タグ一覧", "・"];

/// Field labels of one language section.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub client: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Legacy per-language role label.
    pub role: &'static str,
}

pub const JAPANESE_VOCABULARY: Vocabulary = Vocabulary {
    client: "クライアント:",
    title: "作品名:",
    description: "紹介文:",
    role: "役割:",
};

pub const ENGLISH_VOCABULARY: Vocabulary = Vocabulary {
    client: "Client:",
    title: "Title:",
    description: "Description:",
    role: "Role:",
};

impl Vocabulary {
    pub fn for_language(language: Language) -> &'static Vocabulary {
        match language {
            Language::Japanese => &JAPANESE_VOCABULARY,
            Language::English => &ENGLISH_VOCABULARY,
        }
    }

    fn labels(&self) -> [&'static str; 4] {
        [self.client, self.title, self.description, self.role]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Common,
    Localized(Language),
}

impl Section {
    fn from_header(name: &str) -> Self {
        if COMMON_MARKERS.contains(&name) {
            Section::Common
        } else if JAPANESE_MARKERS.contains(&name) {
            Section::Localized(Language::Japanese)
        } else if ENGLISH_MARKERS.contains(&name) {
            Section::Localized(Language::English)
        } else {
            Section::None
        }
    }
}

/// Returns the trimmed value after `label`, accepting a full-width colon as well.
fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if let Some(rest) = line.strip_prefix(label) {
        return Some(rest.trim());
    }
    let stem = label.strip_suffix(':')?;
    line.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('：'))
        .map(str::trim)
}

/// True when the line carries any field label known to the format, in any section.
fn is_known_field(line: &str) -> bool {
    let common = [ID_LABEL, PRIORITY_LABEL, ROLE_LABEL];
    common
        .iter()
        .chain(TAG_LABELS.iter())
        .chain(JAPANESE_VOCABULARY.labels().iter())
        .chain(ENGLISH_VOCABULARY.labels().iter())
        .any(|label| field_value(line, label).is_some())
}

fn is_note(line: &str) -> bool {
    NOTE_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Splits a tag list on ASCII or ideographic commas, dropping empty entries.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split([',', '、'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a priority value. Anything that is not a positive integer is unset.
pub fn parse_priority(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|p| *p > 0)
        .and_then(|p| u32::try_from(p).ok())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses one metadata document into its common and per-language blocks.
///
/// The explicit `ID:` is left as `None` when absent; deriving a fallback id
/// from the storage location is the caller's job.
pub fn parse_work_text(text: &str) -> ParsedWork {
    let mut work = ParsedWork::default();
    let mut section = Section::None;
    let mut extra_japanese: Vec<&str> = Vec::new();
    let mut extra_english: Vec<&str> = Vec::new();
    // An explicit description line, even an empty one, turns synthesis off
    let mut explicit_description: Vec<Language> = Vec::new();

    for raw_line in text.trim_start_matches('\u{feff}').lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = SECTION_HEADER_REGEX.captures(line) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            section = Section::from_header(name);
            continue;
        }

        match section {
            Section::None => {}
            Section::Common => {
                if let Some(value) = field_value(line, ID_LABEL) {
                    work.id = non_empty(value);
                } else if let Some(value) = field_value(line, PRIORITY_LABEL) {
                    work.priority = parse_priority(value);
                    if work.priority.is_none() {
                        log::debug!("Ignoring unusable priority value {:?}", value);
                    }
                } else if let Some(value) = field_value(line, ROLE_LABEL) {
                    work.role = non_empty(value);
                } else if let Some(value) = TAG_LABELS
                    .iter()
                    .find_map(|label| field_value(line, label))
                {
                    work.tags = parse_tag_list(value);
                }
            }
            Section::Localized(language) => {
                let vocabulary = Vocabulary::for_language(language);
                let fields = work.localized_mut(language);
                if let Some(value) = field_value(line, vocabulary.client) {
                    fields.client = value.to_string();
                } else if let Some(value) = field_value(line, vocabulary.title) {
                    fields.title = value.to_string();
                } else if let Some(value) = field_value(line, vocabulary.description) {
                    fields.description = value.to_string();
                    explicit_description.push(language);
                } else if let Some(value) = field_value(line, vocabulary.role) {
                    fields.role = non_empty(value);
                } else if !is_known_field(line) && !is_note(line) {
                    match language {
                        Language::Japanese => extra_japanese.push(line),
                        Language::English => extra_english.push(line),
                    }
                }
            }
        }
    }

    if !explicit_description.contains(&Language::Japanese) && !extra_japanese.is_empty() {
        work.japanese.description = extra_japanese.join(" ");
    }
    if !explicit_description.contains(&Language::English) && !extra_english.is_empty() {
        work.english.description = extra_english.join(" ");
    }

    work
}

impl ParsedWork {
    /// Resolves the record for one display language.
    ///
    /// The common `Role:` always wins over a per-language role line. `id` is
    /// empty and `storage_location` unset when the document itself does not
    /// provide them.
    pub fn project(&self, language: Language) -> WorkRecord {
        let fields = self.localized(language);
        let role = self
            .role
            .as_deref()
            .or(fields.role.as_deref())
            .map(Role::parse);

        WorkRecord {
            id: self.id.clone().unwrap_or_default(),
            priority: self.priority,
            client: fields.client.clone(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            role,
            tags: self.tags.clone(),
            storage_location: None,
            media: Vec::new(),
            language,
        }
    }
}
