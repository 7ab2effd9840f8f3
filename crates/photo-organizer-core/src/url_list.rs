//! Loading of the plain-text URL list produced by the browser extractor.
//!
//! The file is untrusted: blank lines and malformed entries are skipped and
//! reported, never fatal.

use log::{debug, info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};

/// Substring replacement turning a low-resolution URL into a larger variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRule {
    pub from: String,
    pub to: String,
}

impl UpgradeRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Best-effort extraction heuristics, re-applied when a list is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlRules {
    /// URLs containing any of these (case-insensitive) are dropped
    pub exclude_keywords: Vec<String>,

    /// Applied in order, first match wins
    pub upgrades: Vec<UpgradeRule>,
}

impl Default for UrlRules {
    fn default() -> Self {
        Self {
            exclude_keywords: ["icon", "logo", "avatar", "emoji", "sprite", "favicon"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            upgrades: vec![
                UpgradeRule::new("_thumb", "_large"),
                UpgradeRule::new("/thumb/", "/large/"),
                UpgradeRule::new("_small", "_large"),
                UpgradeRule::new("_medium", "_large"),
                UpgradeRule::new("/thumbnails/", "/originals/"),
            ],
        }
    }
}

impl UrlRules {
    /// Rules that keep every URL unchanged
    pub fn none() -> Self {
        Self {
            exclude_keywords: Vec::new(),
            upgrades: Vec::new(),
        }
    }

    pub fn is_excluded(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.exclude_keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && lower.contains(&keyword.to_lowercase()))
    }

    pub fn upgrade(&self, url: &str) -> String {
        self.upgrades
            .iter()
            .find(|rule| !rule.from.is_empty() && url.contains(&rule.from))
            .map(|rule| url.replacen(&rule.from, &rule.to, 1))
            .unwrap_or_else(|| url.to_string())
    }
}

/// Why a line of the URL file was not used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not an absolute http(s) URL
    Malformed(String),

    /// Matched an exclusion keyword
    Excluded,

    /// Same URL appeared on an earlier line
    Duplicate,
}

/// A line of the URL file that was not used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub content: String,
    pub reason: SkipReason,
}

/// Ordered, unique URLs ready for download
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlList {
    /// Capture order is preserved
    pub urls: Vec<String>,

    /// Non-blank lines that were dropped
    pub skipped: Vec<SkippedLine>,
}

impl UrlList {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Parse URL list text, one URL per line
pub fn parse_url_list(text: &str, rules: &UrlRules) -> UrlList {
    let mut list = UrlList::default();
    let mut seen = HashSet::new();

    for (idx, raw) in text.lines().enumerate() {
        // Tolerate a byte-order mark on the first line
        let line = raw.trim().trim_start_matches('\u{feff}');
        if line.is_empty() {
            continue;
        }

        let skip = |reason| SkippedLine {
            line: idx + 1,
            content: line.to_string(),
            reason,
        };

        if let Err(reason) = check_absolute_url(line) {
            debug!("Skipping line {}: {}", idx + 1, reason);
            list.skipped.push(skip(SkipReason::Malformed(reason)));
            continue;
        }

        if rules.is_excluded(line) {
            list.skipped.push(skip(SkipReason::Excluded));
            continue;
        }

        let url = rules.upgrade(line);
        if !seen.insert(url.clone()) {
            list.skipped.push(skip(SkipReason::Duplicate));
            continue;
        }

        list.urls.push(url);
    }

    list
}

/// Read and parse a URL list file
pub fn load_url_list<P: AsRef<Path>>(path: P, rules: &UrlRules) -> Result<UrlList> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let list = parse_url_list(&text, rules);

    info!(
        "Loaded {} URLs from {} ({} lines skipped)",
        list.len(),
        path.display(),
        list.skipped.len()
    );
    for skipped in list
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::Malformed(_)))
    {
        warn!("Ignoring malformed URL on line {}: {}", skipped.line, skipped.content);
    }

    Ok(list)
}

fn check_absolute_url(line: &str) -> std::result::Result<(), String> {
    let url = Url::parse(line).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(()),
        "http" | "https" => Err("missing host".to_string()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
