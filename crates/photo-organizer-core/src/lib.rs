//! Core functionality for downloading and organizing photos.
//!
//! This library provides the pipeline stages behind the `photo-organizer` tool:
//! - URL list loading with configurable extraction heuristics
//! - Sequential downloading into a staging directory
//! - Exact-duplicate and thumbnail filtering
//! - Date sequencing and collision-free naming
//! - Non-destructive organization into the output layout

// -- External Dependencies --

use log::{info, warn};
use std::path::Path;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::{Config, DateOrder, NamingFormat, ThumbnailRules};
pub use deduplication::{DuplicateFilter, Partition};
pub use download::{DownloadFailure, DownloadSummary, Downloader, Fetch, HttpFetcher};
pub use error::{Error, Result};
pub use organizer::{OrganizeReport, Organizer};
pub use sequencing::{DateRange, Sequencer};
pub use types::*;
pub use url_list::{UrlList, UrlRules};

// -- Public Modules --
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod download;
pub mod logging;
pub mod organizer;
pub mod processing;
pub mod sequencing;
pub mod types;
pub mod url_list;

/// Result of a pipeline run; stages that did not run are `None`
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub download: Option<DownloadSummary>,
    pub partition: Option<Partition>,
    pub organize: Option<OrganizeReport>,
}

/// Main entry point for the photo pipeline
pub struct PhotoOrganizer {
    config: Config,
}

impl PhotoOrganizer {
    /// Create a new PhotoOrganizer with the provided configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read a URL list file, applying the configured rules
    pub fn load_urls<P: AsRef<Path>>(&self, path: P) -> Result<UrlList> {
        url_list::load_url_list(path, &self.config.url_rules)
    }

    /// Download URLs into the staging directory over HTTP
    pub fn download(&self, urls: &[String]) -> Result<DownloadSummary> {
        Downloader::http(&self.config.download_dir, &self.config.download)?.download_all(urls)
    }

    /// Download URLs with a caller-supplied transport
    pub fn download_with<F: Fetch>(&self, fetcher: F, urls: &[String]) -> Result<DownloadSummary> {
        Downloader::new(fetcher, &self.config.download_dir).download_all(urls)
    }

    /// Move thumbnails and duplicates out of the staging directory
    pub fn filter(&self) -> Result<Partition> {
        DuplicateFilter::new(&self.config).run()
    }

    /// Name unique photos, dated when a range is given
    pub fn sequence(
        &self,
        photos: Vec<PhotoRecord>,
        range: Option<&DateRange>,
    ) -> Result<Vec<PhotoRecord>> {
        let sequencer = Sequencer::from_config(&self.config);
        match range {
            Some(range) => sequencer.sequence(photos, range),
            None => sequencer.sequence_undated(photos),
        }
    }

    /// Copy sequenced photos into the organized directory
    pub fn organize(&self, photos: &[PhotoRecord]) -> Result<OrganizeReport> {
        Organizer::new(&self.config.organized_dir).organize(photos)
    }

    /// Filter, sequence and organize whatever is in the staging directory.
    ///
    /// Stops after the filter, without error, when no unique photo is left.
    pub fn organize_staged(&self, range: Option<&DateRange>) -> Result<PipelineReport> {
        self.config.ensure_dirs()?;

        let partition = self.filter()?;
        if partition.unique.is_empty() {
            warn!("No unique photos left after filtering; nothing to organize");
            return Ok(PipelineReport {
                partition: Some(partition),
                ..Default::default()
            });
        }

        let named = self.sequence(partition.unique.clone(), range)?;
        let organized = self.organize(&named)?;

        Ok(PipelineReport {
            download: None,
            partition: Some(partition),
            organize: Some(organized),
        })
    }

    /// Full run over HTTP: load, download, filter, sequence, organize
    pub fn run<P: AsRef<Path>>(&self, url_file: P, range: Option<&DateRange>) -> Result<PipelineReport> {
        let fetcher = HttpFetcher::new(&self.config.download)?;
        self.run_with(fetcher, url_file, range)
    }

    /// Full run with a caller-supplied transport.
    ///
    /// Halts after the download step when the URL list is empty.
    pub fn run_with<F: Fetch, P: AsRef<Path>>(
        &self,
        fetcher: F,
        url_file: P,
        range: Option<&DateRange>,
    ) -> Result<PipelineReport> {
        info!("Loading URLs...");
        let urls = self.load_urls(url_file)?;

        let summary = Downloader::new(fetcher, &self.config.download_dir)
            .with_delay(std::time::Duration::from_millis(self.config.download.delay_ms))
            .download_all(&urls.urls)?;

        if summary.attempted() == 0 {
            info!("Nothing to download; stopping before the filter");
            return Ok(PipelineReport {
                download: Some(summary),
                ..Default::default()
            });
        }

        let mut report = self.organize_staged(range)?;
        report.download = Some(summary);
        Ok(report)
    }
}
