//! Splits the staging directory into unique photos, thumbnails and exact
//! duplicates.
//!
//! Classification is a pure function of the staged files and their staging
//! order, so re-running over an unchanged directory gives the same partition.
//! Thumbnails win over duplicates: a small re-download is filed as a
//! thumbnail, keeping the duplicate bucket for exact re-downloads of real
//! photos.

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{Config, ThumbnailRules};
use crate::discovery::discover_staged_images;
use crate::error::Result;
use crate::logging::{log_file_error, log_fs_modification};
use crate::processing::{compute_cryptographic, read_dimensions};
use crate::types::{file_name_of, Classification, PhotoRecord};

/// An exact duplicate and the unique photo it repeats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePhoto {
    pub record: PhotoRecord,
    pub canonical: PathBuf,
}

/// The three disjoint buckets of the staged set, each in staging order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub unique: Vec<PhotoRecord>,
    pub thumbnails: Vec<PhotoRecord>,
    pub duplicates: Vec<DuplicatePhoto>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.unique.len() + self.thumbnails.len() + self.duplicates.len()
    }
}

/// Hash, size and dimensions of every staged image, in staging order
pub fn inspect_staged<P: AsRef<Path>>(staging_dir: P) -> Result<Vec<PhotoRecord>> {
    let paths = discover_staged_images(staging_dir)?;

    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    progress.set_message("Hashing staged photos...");

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let record = inspect_file(&path)?;
        records.push(record);
        progress.inc(1);
    }

    progress.finish_with_message(format!("Inspected {} photos", records.len()));
    Ok(records)
}

fn inspect_file(path: &Path) -> Result<PhotoRecord> {
    let size = std::fs::metadata(path)?.len();
    let content_hash = compute_cryptographic(path)?.to_string();
    let dimensions = read_dimensions(path);

    Ok(PhotoRecord {
        source_url: None,
        staged_path: path.to_path_buf(),
        content_hash,
        size,
        dimensions,
        assigned_date: None,
        sequence_letter: None,
        final_name: None,
    })
}

/// Whether a record falls below the thumbnail thresholds.
///
/// Unknown dimensions never make a photo a thumbnail on their own.
pub fn is_thumbnail(record: &PhotoRecord, rules: &ThumbnailRules) -> bool {
    let too_small = record
        .dimensions
        .map(|(w, h)| w < rules.min_width || h < rules.min_height)
        .unwrap_or(false);

    let too_light = rules.min_file_size_kb > 0 && record.size < rules.min_file_size_kb.saturating_mul(1024);

    let name = record.file_name().to_lowercase();
    let thumb_name = rules
        .name_keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && name.contains(&keyword.to_lowercase()));

    too_small || too_light || thumb_name
}

/// Classify records given in staging order.
///
/// The first unique photo with a given hash is canonical; later ones with the
/// same hash are duplicates of it.
pub fn classify(records: &[PhotoRecord], rules: &ThumbnailRules) -> Vec<Classification> {
    let mut canonical_by_hash: HashMap<&str, &Path> = HashMap::new();

    records
        .iter()
        .map(|record| {
            if is_thumbnail(record, rules) {
                return Classification::Thumbnail;
            }
            match canonical_by_hash.get(record.content_hash.as_str()) {
                Some(canonical) => Classification::Duplicate {
                    canonical: canonical.to_path_buf(),
                },
                None => {
                    canonical_by_hash.insert(&record.content_hash, &record.staged_path);
                    Classification::Unique
                }
            }
        })
        .collect()
}

/// Partition records given in staging order
pub fn partition(records: Vec<PhotoRecord>, rules: &ThumbnailRules) -> Partition {
    let classes = classify(&records, rules);
    let mut result = Partition::default();

    for (record, class) in records.into_iter().zip(classes) {
        match class {
            Classification::Unique => result.unique.push(record),
            Classification::Thumbnail => result.thumbnails.push(record),
            Classification::Duplicate { canonical } => {
                result.duplicates.push(DuplicatePhoto { record, canonical })
            }
        }
    }

    result
}

/// Inspects the staging directory and siphons off thumbnails and duplicates
pub struct DuplicateFilter<'a> {
    config: &'a Config,
}

impl<'a> DuplicateFilter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Classify without touching any file
    pub fn scan(&self) -> Result<Partition> {
        let records = inspect_staged(&self.config.download_dir)?;
        Ok(partition(records, &self.config.thumbnails))
    }

    /// Classify, then move thumbnails and duplicates to their backup
    /// directories. The returned records point at the new locations.
    pub fn run(&self) -> Result<Partition> {
        let mut result = self.scan()?;

        for record in &mut result.thumbnails {
            record.staged_path = move_preserving_name(&record.staged_path, &self.config.thumbnails_dir)?;
        }
        for duplicate in &mut result.duplicates {
            duplicate.record.staged_path =
                move_preserving_name(&duplicate.record.staged_path, &self.config.duplicates_dir)?;
        }

        info!(
            "Filter kept {} unique photos, moved {} thumbnails and {} duplicates",
            result.unique.len(),
            result.thumbnails.len(),
            result.duplicates.len()
        );
        Ok(result)
    }
}

/// Move a file into `dest_dir` under its own name, appending `_N` to the stem
/// when that name is taken. Never overwrites.
pub fn move_preserving_name(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dest_dir)?;
    let dest = free_destination(dest_dir, &file_name_of(src));

    if let Err(rename_err) = std::fs::rename(src, &dest) {
        // Different file systems: copy, then drop the source
        warn!("Rename of {} failed ({}), copying instead", src.display(), rename_err);
        if let Err(e) = std::fs::copy(src, &dest) {
            log_file_error(src, "copy", &e);
            return Err(e.into());
        }
        std::fs::remove_file(src)?;
    }

    log_fs_modification("move", src, Some(&dest.display().to_string()));
    Ok(dest)
}

fn free_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
