//! Common test utilities and constants for the Folio crate.
//!
//! Provides self-removing test directories, helpers for
//! writing work folders, and an in-memory source for discovery tests.

use async_trait::async_trait;
use folio::error::{Error, Result};
use folio::source::{ListingEntry, WorkSource};
use rand::{Rng, distributions::Alphanumeric};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::fs;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

#[allow(dead_code)]
pub struct TestDirs {
    pub base_dir: PathBuf,
    pub source_dir: PathBuf,
}

// Removed even when the test panics
impl Drop for TestDirs {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.base_dir);
    }
}

/// Creates a clean, uniquely named test directory with a `source` subdirectory.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let base_dir = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if base_dir.exists() {
        fs::remove_dir_all(&base_dir).await.unwrap();
    }
    let source_dir = base_dir.join("source");
    fs::create_dir_all(&source_dir).await.unwrap();

    TestDirs {
        base_dir,
        source_dir,
    }
}

/// Writes a text file, creating its parent folders.
#[allow(dead_code)]
pub async fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await?;
    Ok(())
}

/// Creates an empty media file; discovery only looks at names.
#[allow(dead_code)]
pub async fn create_dummy_media(path: &Path) -> Result<()> {
    write_file(path, "").await
}

/// A complete metadata document with the given id, priority and tags.
#[allow(dead_code)]
pub fn metadata_text(id: Option<&str>, priority: Option<&str>, tags: &str, title: &str) -> String {
    let mut text = String::from("--- 共通 ---\n");
    if let Some(id) = id {
        text.push_str(&format!("ID: {}\n", id));
    }
    if let Some(priority) = priority {
        text.push_str(&format!("Priority: {}\n", priority));
    }
    text.push_str("Role: designer\n");
    text.push_str(&format!("タグ: {}\n\n", tags));
    text.push_str("--- 日本語 ---\n");
    text.push_str("クライアント: アクメ社\n");
    text.push_str(&format!("作品名: {} (ja)\n", title));
    text.push_str("紹介文: 日本語の紹介文。\n\n");
    text.push_str("--- English ---\n");
    text.push_str("Client: Acme Co\n");
    text.push_str(&format!("Title: {}\n", title));
    text.push_str("Description: English description.\n");
    text
}

/// In-memory [`WorkSource`] keyed by relative path.
///
/// Directories exist implicitly through the files below them. Listing can be
/// switched off to behave like a web server without autoindex.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
    listable: bool,
    exists_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl MemorySource {
    pub fn new(listable: bool) -> Self {
        Self {
            listable,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_media(self, location: &str, names: &[&str]) -> Self {
        names.iter().fold(self, |source, name| {
            source.with_file(&format!("{}/{}", location, name), "")
        })
    }

    /// Delays every existence check so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Highest number of existence checks that were running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkSource for MemorySource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.files.contains_key(path))
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<ListingEntry>>> {
        if !self.listable {
            return Ok(None);
        }
        let prefix = match dir.trim_matches('/') {
            "" => String::new(),
            trimmed => format!("{}/", trimmed),
        };
        let mut dirs: BTreeSet<String> = BTreeSet::new();
        let mut files: BTreeSet<String> = BTreeSet::new();
        for path in self.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => dirs.insert(child.to_string()),
                None => files.insert(rest.to_string()),
            };
        }
        if dirs.is_empty() && files.is_empty() && !prefix.is_empty() {
            return Err(Error::NotFound(dir.to_string()));
        }
        let entries = dirs
            .into_iter()
            .map(ListingEntry::dir)
            .chain(files.into_iter().map(ListingEntry::file))
            .collect();
        Ok(Some(entries))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
