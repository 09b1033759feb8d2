//! Read-only views over a discovered collection: featured works, tag
//! filtering and tag counts, and display helpers for tags.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::discovery::DiscoveryPass;
use crate::types::{Language, TagFilter, WorkRecord};

/// Japanese tag names and their English display forms.
const TAG_TRANSLATIONS: &[(&str, &str)] = &[
    ("ロゴ", "Logo"),
    ("UI/UX", "UI/UX"),
    ("ブランディング", "Branding"),
    ("Web", "Web"),
    ("キャラクターデザイン", "Character Design"),
    ("パッケージ", "Package"),
    ("イラストレーション", "Illustration"),
];

/// Display form of a tag. Tags are authored in Japanese; unknown tags are shown as written.
pub fn translate_tag(tag: &str, language: Language) -> &str {
    match language {
        Language::Japanese => tag,
        Language::English => TAG_TRANSLATIONS
            .iter()
            .find(|(ja, _)| *ja == tag)
            .map(|(_, en)| *en)
            .unwrap_or(tag),
    }
}

/// The records of one discovery pass, projected for one language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<WorkRecord>,
}

impl Catalog {
    pub fn new(records: Vec<WorkRecord>) -> Self {
        Self { records }
    }

    pub fn from_pass(pass: &DiscoveryPass, language: Language) -> Self {
        Self::new(pass.project(language))
    }

    pub fn records(&self) -> &[WorkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WorkRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Works with a priority, lowest priority value first. Ties keep discovery order.
    pub fn featured(&self) -> Vec<&WorkRecord> {
        let mut featured: Vec<&WorkRecord> =
            self.records.iter().filter(|r| r.is_featured()).collect();
        featured.par_sort_by_key(|r| r.priority);
        featured
    }

    /// Distinct tags in the order they first appear.
    pub fn tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for tag in self.records.iter().flat_map(|r| r.tags.iter()) {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag);
            }
        }
        seen
    }

    /// Number of records carrying each tag. A record is counted once per tag
    /// even if the tag is repeated in its metadata.
    pub fn tag_counts(&self) -> HashMap<String, usize> {
        self.records
            .par_iter()
            .fold(HashMap::new, |mut counts: HashMap<String, usize>, record| {
                let mut own: Vec<&String> = record.tags.iter().collect();
                own.sort();
                own.dedup();
                for tag in own {
                    *counts.entry(tag.clone()).or_insert(0) += 1;
                }
                counts
            })
            .reduce(HashMap::new, |mut a, b| {
                for (tag, count) in b {
                    *a.entry(tag).or_insert(0) += count;
                }
                a
            })
    }

    pub fn count_for(&self, tag: &str) -> usize {
        self.records.iter().filter(|r| r.has_tag(tag)).count()
    }

    /// Records matching the filter, in catalog order.
    pub fn filter(&self, filter: &TagFilter) -> Vec<&WorkRecord> {
        match filter {
            TagFilter::All => self.records.iter().collect(),
            TagFilter::Tag(tag) => self.records.iter().filter(|r| r.has_tag(tag)).collect(),
        }
    }
}

impl From<Vec<WorkRecord>> for Catalog {
    fn from(records: Vec<WorkRecord>) -> Self {
        Self::new(records)
    }
}
