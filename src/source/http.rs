//! Static HTTP hosting backend.
//!
//! Existence checks use `HEAD`, text files use `GET`. Directory listings are
//! read from autoindex-style HTML pages (Apache, nginx, `python -m http.server`)
//! when the server provides them.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};

use super::{ListingEntry, WorkSource};
use crate::error::{Error, Result};
use crate::naming::is_hidden;

/// Default timeout applied to every request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

lazy_static! {
    /// Extracts link targets from a directory index page.
    static ref HREF_REGEX: Regex = Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap();
}

/// Reads works from a static web server.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Url,
}

impl HttpSource {
    /// Creates a source for `base_url`, the folder that holds the work locations.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Creates a source that shares an existing client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidUrl(path.to_string(), e.to_string()))
    }
}

/// Parses a base URL, making sure it is treated as a folder.
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized)
        .map_err(|e| Error::InvalidUrl(base_url.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidUrl(
            base_url.to_string(),
            format!("unsupported scheme '{}'", other),
        )),
    }
}

/// Extracts the direct children of `listing_url` from an index page.
///
/// Links are resolved against the listing URL, so relative (`works-1/`) and
/// absolute (`/images/works-1/`) forms both work. Parent, sibling, query and
/// off-site links are ignored, as are duplicates.
pub fn parse_listing(html: &str, listing_url: &Url) -> Vec<ListingEntry> {
    let mut entries: Vec<ListingEntry> = Vec::new();
    let base_path = listing_url.path();

    for caps in HREF_REGEX.captures_iter(html) {
        let href = match caps.get(1) {
            Some(m) => m.as_str().trim(),
            None => continue,
        };
        if href.starts_with('?') || href.starts_with('#') {
            continue;
        }
        let resolved = match listing_url.join(href) {
            Ok(url) => url,
            Err(_) => continue,
        };
        if resolved.origin() != listing_url.origin() || resolved.query().is_some() {
            continue;
        }
        let child = match resolved.path().strip_prefix(base_path) {
            Some(rest) if !rest.is_empty() => rest,
            _ => continue,
        };
        let (raw_name, is_dir) = match child.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            None => (child, false),
        };
        if raw_name.is_empty() || raw_name.contains('/') {
            continue;
        }
        let name = match urlencoding::decode(raw_name) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw_name.to_string(),
        };
        if is_hidden(&name) || entries.iter().any(|e| e.name == name) {
            continue;
        }
        entries.push(ListingEntry { name, is_dir });
    }

    entries
}

/// True when the page links to the parent of `listing_url`, as autoindex pages do.
pub fn links_to_parent(html: &str, listing_url: &Url) -> bool {
    let parent = match listing_url.join("../") {
        Ok(parent) if parent.path() != listing_url.path() => parent,
        _ => return false,
    };
    HREF_REGEX
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| listing_url.join(m.as_str().trim()).ok())
        .any(|resolved| {
            resolved.origin() == parent.origin()
                && resolved.path() == parent.path()
                && resolved.query().is_none()
        })
}

#[async_trait]
impl WorkSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.url(path)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16(), path.to_string()));
        }
        Ok(response.text().await?)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let url = self.url(path)?;
        let response = self.client.head(url).send().await?;
        Ok(response.status().is_success())
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<ListingEntry>>> {
        let mut dir_path = dir.trim_matches('/').to_string();
        if !dir_path.is_empty() {
            dir_path.push('/');
        }
        let url = self.url(&dir_path)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::debug!("No listing for '{}' (status {})", url, status);
            return Ok(None);
        }
        // A redirected listing request usually lands on an unrelated page, e.g. the site index
        let final_url = response.url().clone();
        if status == StatusCode::OK && final_url.path() != url.path() {
            log::debug!("Listing for '{}' redirected to '{}'", url, final_url);
            return Ok(None);
        }
        let html = response.text().await?;
        let entries = parse_listing(&html, &url);
        // Hosts without autoindex often answer with an SPA shell or a folder index.html
        if entries.is_empty() && !links_to_parent(&html, &url) {
            log::debug!("'{}' is not a directory index page", url);
            return Ok(None);
        }
        Ok(Some(entries))
    }

    fn describe(&self) -> String {
        format!("web root {}", self.base)
    }
}
