//! Sequential downloader filling the staging directory.
//!
//! Each URL gets exactly one attempt. Failures are recorded per item and the
//! batch carries on; the caller re-runs to retry.

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::DownloadSettings;
use crate::discovery::{highest_staging_index, STAGED_PREFIX};
use crate::error::Result;
use crate::logging::log_fs_modification;
use crate::processing::hash_bytes;
use crate::types::{ImageFormat, PhotoRecord};

/// Why a single URL could not be staged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("not an image (content type '{0}')")]
    NotAnImage(String),

    #[error("could not write file: {0}")]
    Write(String),
}

/// A fetched HTTP resource, before any checks
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Transport used by the downloader
pub trait Fetch {
    fn fetch(&self, url: &str) -> std::result::Result<FetchedResource, DownloadFailure>;
}

/// Blocking reqwest transport
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &DownloadSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<FetchedResource, DownloadFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DownloadFailure::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response
            .bytes()
            .map_err(|e| DownloadFailure::Network(e.to_string()))?
            .to_vec();

        Ok(FetchedResource {
            status,
            content_type,
            body,
        })
    }
}

/// Result for one URL of the list
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// 0-based position in the URL list
    pub index: usize,
    pub url: String,
    pub result: std::result::Result<PhotoRecord, DownloadFailure>,
}

/// Outcome of a whole batch, in URL-list order
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    pub outcomes: Vec<DownloadOutcome>,
}

impl DownloadSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Records of successfully staged photos
    pub fn records(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// URLs that need a manual re-run, with the reason
    pub fn failures(&self) -> impl Iterator<Item = (&str, &DownloadFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.url.as_str(), e)))
    }
}

/// Downloads a URL list into the staging directory
pub struct Downloader<F: Fetch> {
    fetcher: F,
    staging_dir: PathBuf,
    delay: Duration,
}

impl Downloader<HttpFetcher> {
    /// Downloader backed by a real HTTP client
    pub fn http<P: AsRef<Path>>(staging_dir: P, settings: &DownloadSettings) -> Result<Self> {
        Ok(Self::new(HttpFetcher::new(settings)?, staging_dir)
            .with_delay(Duration::from_millis(settings.delay_ms)))
    }
}

impl<F: Fetch> Downloader<F> {
    pub fn new<P: AsRef<Path>>(fetcher: F, staging_dir: P) -> Self {
        Self {
            fetcher,
            staging_dir: staging_dir.as_ref().to_path_buf(),
            delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive requests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetch every URL once, in order
    pub fn download_all(&self, urls: &[String]) -> Result<DownloadSummary> {
        let mut summary = DownloadSummary::default();
        if urls.is_empty() {
            info!("No URLs to download");
            return Ok(summary);
        }

        std::fs::create_dir_all(&self.staging_dir)?;

        // Continue after earlier batches so their originals are never replaced
        let offset = highest_staging_index(&self.staging_dir)? as usize;
        if offset > 0 {
            info!("Staging directory already holds photos up to {}", offset);
        }

        let progress = ProgressBar::new(urls.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }

            progress.set_message(format!("{} failed", summary.failed()));
            let result = self.download_one(offset + index, url);
            if let Err(e) = &result {
                warn!("Failed to download {}: {}", url, e);
            }

            summary.outcomes.push(DownloadOutcome {
                index,
                url: url.clone(),
                result,
            });
            progress.inc(1);
        }

        progress.finish_with_message(format!(
            "{} downloaded, {} failed",
            summary.succeeded(),
            summary.failed()
        ));
        info!(
            "Download finished: {} attempted, {} succeeded, {} failed",
            summary.attempted(),
            summary.succeeded(),
            summary.failed()
        );

        Ok(summary)
    }

    fn download_one(
        &self,
        slot: usize,
        url: &str,
    ) -> std::result::Result<PhotoRecord, DownloadFailure> {
        let resource = self.fetcher.fetch(url)?;

        if !(200..300).contains(&resource.status) {
            return Err(DownloadFailure::Status(resource.status));
        }

        let content_type = resource.content_type.unwrap_or_default();
        if !content_type.is_empty() && !content_type.to_lowercase().contains("image") {
            return Err(DownloadFailure::NotAnImage(content_type));
        }

        if resource.body.is_empty() {
            return Err(DownloadFailure::EmptyBody);
        }

        let file_name = staged_file_name(slot, &content_type, url);
        let path = self.staging_dir.join(&file_name);
        write_atomically(&path, &resource.body)
            .map_err(|e| DownloadFailure::Write(e.to_string()))?;

        let content_hash = hash_bytes(&resource.body).to_string();
        debug!("Staged {} as {} ({})", url, file_name, content_hash);
        log_fs_modification("download", &path, Some(url));

        Ok(PhotoRecord {
            source_url: Some(url.to_string()),
            staged_path: path,
            content_hash,
            size: resource.body.len() as u64,
            dimensions: None,
            assigned_date: None,
            sequence_letter: None,
            final_name: None,
        })
    }
}

/// `photo_NNNN.ext` for the 0-based staging slot
pub fn staged_file_name(index: usize, content_type: &str, url: &str) -> String {
    format!(
        "{}{:04}.{}",
        STAGED_PREFIX,
        index + 1,
        extension_for(content_type, url)
    )
}

/// Pick an extension from the content type, then the URL path, else `jpg`
fn extension_for(content_type: &str, url: &str) -> String {
    if let Some(format) = ImageFormat::from_content_type(content_type) {
        return format.extension().to_string();
    }

    let path = reqwest::Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());

    Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .map(ImageFormat::from_extension)
        .filter(|format| format.is_supported())
        .map(|format| format.extension().to_string())
        .unwrap_or_else(|| "jpg".to_string())
}

/// Write through a `.part` file so an interrupted run never leaves a
/// truncated image under a staged name. An existing file is never replaced.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    std::fs::write(&partial, bytes)?;
    std::fs::rename(&partial, path)
}
