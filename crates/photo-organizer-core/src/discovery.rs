use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::ImageFormat;

/// Prefix of the temporary names given by the downloader
pub const STAGED_PREFIX: &str = "photo_";

/// List image files directly inside the staging directory, in staging order.
///
/// Staging order is the URL-list index encoded in `photo_NNNN` names, so that
/// `photo_10000` follows `photo_9999`; other names follow in lexicographic
/// order.
pub fn discover_staged_images<P: AsRef<Path>>(staging_dir: P) -> Result<Vec<PathBuf>> {
    let staging_dir = staging_dir.as_ref();

    if !staging_dir.exists() {
        return Err(Error::FileNotFound(staging_dir.to_path_buf()));
    }

    let mut image_files: Vec<PathBuf> = WalkDir::new(staging_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| is_image_path(path))
        .collect();

    image_files.sort_by(|a, b| compare_staging_order(a, b));
    Ok(image_files)
}

/// Returns if the given path has a supported image extension
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ImageFormat::from_extension(ext).is_supported())
        .unwrap_or(false)
}

/// Highest `photo_NNNN` index already in the staging directory, 0 if none
pub fn highest_staging_index<P: AsRef<Path>>(staging_dir: P) -> Result<u64> {
    let staging_dir = staging_dir.as_ref();
    if !staging_dir.exists() {
        return Ok(0);
    }

    let highest = WalkDir::new(staging_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| staging_index(e.path()))
        .max()
        .unwrap_or(0);

    Ok(highest)
}

/// Index encoded in a downloader name such as `photo_0042.jpg`
pub fn staging_index(path: &Path) -> Option<u64> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix(STAGED_PREFIX))
        .and_then(|digits| digits.parse().ok())
}

fn compare_staging_order(a: &Path, b: &Path) -> Ordering {
    match (staging_index(a), staging_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.file_name().cmp(&b.file_name())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.file_name().cmp(&b.file_name()),
    }
}

// -- Tests --
