use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::url_list::UrlRules;

/// Default name of the settings file
pub const CONFIG_FILE_NAME: &str = "config.json";

/// How assigned dates are rendered in organized filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingFormat {
    /// 250128
    #[serde(rename = "YYMMDD")]
    TwoDigitYear,

    /// 20250128
    #[serde(rename = "YYYYMMDD")]
    FourDigitYear,

    /// 2025-01-28
    #[serde(rename = "YYYY-MM-DD")]
    Iso,

    /// 012825
    #[serde(rename = "MMDDYY")]
    MonthDayYear,

    /// 280125
    #[serde(rename = "DDMMYY")]
    DayMonthYear,
}

impl NamingFormat {
    pub const ALL: [NamingFormat; 5] = [
        NamingFormat::TwoDigitYear,
        NamingFormat::FourDigitYear,
        NamingFormat::Iso,
        NamingFormat::MonthDayYear,
        NamingFormat::DayMonthYear,
    ];

    /// The user-facing pattern, also used in the settings file
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::TwoDigitYear => "YYMMDD",
            Self::FourDigitYear => "YYYYMMDD",
            Self::Iso => "YYYY-MM-DD",
            Self::MonthDayYear => "MMDDYY",
            Self::DayMonthYear => "DDMMYY",
        }
    }

    fn strftime(&self) -> &'static str {
        match self {
            Self::TwoDigitYear => "%y%m%d",
            Self::FourDigitYear => "%Y%m%d",
            Self::Iso => "%Y-%m-%d",
            Self::MonthDayYear => "%m%d%y",
            Self::DayMonthYear => "%d%m%y",
        }
    }

    /// Render a date in this format
    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.strftime()).to_string()
    }
}

impl fmt::Display for NamingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

impl FromStr for NamingFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|format| format.pattern() == wanted)
            .ok_or_else(|| Error::Configuration(format!("Unknown naming format: {}", s)))
    }
}

/// Direction in which photos are spread across a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// First photo in sequence gets the earliest date
    OldestFirst,

    /// First photo in sequence gets the latest date
    NewestFirst,
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OldestFirst => f.write_str("oldest_first"),
            Self::NewestFirst => f.write_str("newest_first"),
        }
    }
}

impl FromStr for DateOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "oldest_first" => Ok(Self::OldestFirst),
            "newest_first" => Ok(Self::NewestFirst),
            other => Err(Error::Configuration(format!("Unknown date order: {}", other))),
        }
    }
}

/// Rules deciding whether a staged image is a low-value thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailRules {
    /// Images narrower than this are thumbnails
    pub min_width: u32,

    /// Images shorter than this are thumbnails
    pub min_height: u32,

    /// Files smaller than this many KiB are thumbnails (0 disables the check)
    pub min_file_size_kb: u64,

    /// Case-insensitive filename fragments marking a thumbnail
    pub name_keywords: Vec<String>,
}

impl Default for ThumbnailRules {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            min_file_size_kb: 0,
            name_keywords: ["thumb", "_sm", "_xs", "-small", "mini"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Settings for the HTTP downloader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Pause between consecutive requests in milliseconds
    pub delay_ms: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 30,
            delay_ms: 200,
        }
    }
}

/// Configuration for the photo pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Staging directory for raw downloads; originals stay here
    pub download_dir: PathBuf,

    /// Where date-named photos end up
    pub organized_dir: PathBuf,

    /// Where filtered-out thumbnails are moved
    pub thumbnails_dir: PathBuf,

    /// Where filtered-out exact duplicates are moved
    pub duplicates_dir: PathBuf,

    /// Date rendering in organized filenames
    pub naming_format: NamingFormat,

    /// Direction of date assignment
    pub date_order: DateOrder,

    /// Thumbnail detection thresholds
    pub thumbnails: ThumbnailRules,

    /// HTTP settings
    pub download: DownloadSettings,

    /// Heuristics re-applied to loaded URL lists
    pub url_rules: UrlRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads_raw"),
            organized_dir: PathBuf::from("photos_organized"),
            thumbnails_dir: PathBuf::from("thumbnails_backup"),
            duplicates_dir: PathBuf::from("duplicates_backup"),
            naming_format: NamingFormat::TwoDigitYear,
            date_order: DateOrder::NewestFirst,
            thumbnails: ThumbnailRules::default(),
            download: DownloadSettings::default(),
            url_rules: UrlRules::default(),
        }
    }
}

impl Config {
    /// Default layout rooted at `base`
    pub fn with_base_dir<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let defaults = Self::default();
        Self {
            download_dir: base.join(&defaults.download_dir),
            organized_dir: base.join(&defaults.organized_dir),
            thumbnails_dir: base.join(&defaults.thumbnails_dir),
            duplicates_dir: base.join(&defaults.duplicates_dir),
            ..defaults
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load settings, creating the file with defaults on first run.
    ///
    /// A file that cannot be read, parsed or validated is left in place and
    /// the defaults are used for this run.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_file(path)?;
            info!("Created default configuration at {}", path.display());
            return Ok(config);
        }

        match Self::from_file(path).and_then(|config| config.validate().map(|_| config)) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("{}; using built-in defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let dirs = [
            ("download_dir", &self.download_dir),
            ("organized_dir", &self.organized_dir),
            ("thumbnails_dir", &self.thumbnails_dir),
            ("duplicates_dir", &self.duplicates_dir),
        ];

        for (name, dir) in &dirs {
            if dir.as_os_str().is_empty() {
                return Err(Error::Configuration(format!("{} must not be empty", name)));
            }
        }

        for (i, (name_a, a)) in dirs.iter().enumerate() {
            for (name_b, b) in dirs.iter().skip(i + 1) {
                if a == b {
                    return Err(Error::Configuration(format!(
                        "{} and {} must be different directories",
                        name_a, name_b
                    )));
                }
            }
        }

        if self.download.timeout_secs == 0 {
            return Err(Error::Configuration(
                "Download timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// Keys accepted by [`Config::set`]
    pub const SETTABLE_KEYS: [&'static str; 12] = [
        "download_dir",
        "organized_dir",
        "thumbnails_dir",
        "duplicates_dir",
        "naming_format",
        "date_order",
        "min_width",
        "min_height",
        "min_file_size_kb",
        "user_agent",
        "timeout_secs",
        "delay_ms",
    ];

    /// Change one setting from its textual form, then re-validate.
    ///
    /// The configuration is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        let value = value.trim();

        match key {
            "download_dir" => updated.download_dir = PathBuf::from(value),
            "organized_dir" => updated.organized_dir = PathBuf::from(value),
            "thumbnails_dir" => updated.thumbnails_dir = PathBuf::from(value),
            "duplicates_dir" => updated.duplicates_dir = PathBuf::from(value),
            "naming_format" => updated.naming_format = value.parse()?,
            "date_order" => updated.date_order = value.parse()?,
            "min_width" => updated.thumbnails.min_width = parse_number(key, value)?,
            "min_height" => updated.thumbnails.min_height = parse_number(key, value)?,
            "min_file_size_kb" => updated.thumbnails.min_file_size_kb = parse_number(key, value)?,
            "user_agent" => updated.download.user_agent = value.to_string(),
            "timeout_secs" => updated.download.timeout_secs = parse_number(key, value)?,
            "delay_ms" => updated.download.delay_ms = parse_number(key, value)?,
            other => {
                return Err(Error::Configuration(format!(
                    "Unknown setting '{}' (expected one of: {})",
                    other,
                    Self::SETTABLE_KEYS.join(", ")
                )))
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Create every directory of the output layout
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.download_dir,
            &self.organized_dir,
            &self.thumbnails_dir,
            &self.duplicates_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Configuration(format!("{} expects a whole number, got '{}'", key, value)))
}
