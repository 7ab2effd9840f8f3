use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported image formats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    Tiff,
    Other(String),
}

impl ImageFormat {
    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "webp" => Self::Webp,
            "bmp" => Self::Bmp,
            "tif" | "tiff" => Self::Tiff,
            other => Self::Other(other.to_string()),
        }
    }

    /// Determine format from an HTTP `Content-Type` value
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_lowercase();
        if content_type.contains("jpeg") || content_type.contains("jpg") {
            Some(Self::Jpeg)
        } else if content_type.contains("png") {
            Some(Self::Png)
        } else if content_type.contains("gif") {
            Some(Self::Gif)
        } else if content_type.contains("webp") {
            Some(Self::Webp)
        } else {
            None
        }
    }

    /// Check if format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Extension written for newly downloaded files
    pub fn extension(&self) -> &str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Other(ext) => ext,
        }
    }
}

/// A photo as it moves through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Where the photo was downloaded from, if known
    pub source_url: Option<String>,

    /// Path of the file in the staging directory
    pub staged_path: PathBuf,

    /// BLAKE3 digest of the file contents, hex encoded
    pub content_hash: String,

    /// File size in bytes
    pub size: u64,

    /// Pixel dimensions (width, height) if the image could be read
    pub dimensions: Option<(u32, u32)>,

    /// Date assigned by the sequencer
    pub assigned_date: Option<NaiveDate>,

    /// Same-day suffix assigned by the sequencer
    pub sequence_letter: Option<String>,

    /// Name in the organized directory
    pub final_name: Option<String>,
}

impl PhotoRecord {
    pub fn file_name(&self) -> String {
        file_name_of(&self.staged_path)
    }

    /// Lowercase extension of the staged file, without the dot
    pub fn extension(&self) -> String {
        self.staged_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }
}

/// Filter verdict for a staged photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Kept for sequencing
    Unique,

    /// Below the size thresholds
    Thumbnail,

    /// Same content as an earlier unique photo
    Duplicate { canonical: PathBuf },
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
