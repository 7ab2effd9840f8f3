use log::warn;
use std::path::Path;

use crate::error::Result;

/// Read pixel dimensions from the image header without decoding the pixels
pub fn image_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
    let reader = image::io::Reader::open(path.as_ref())?.with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Like [`image_dimensions`], but `None` when the file is not a readable image
pub fn read_dimensions<P: AsRef<Path>>(path: P) -> Option<(u32, u32)> {
    let path_ref = path.as_ref();

    match image_dimensions(path_ref) {
        Ok(dims) => Some(dims),
        Err(e) => {
            warn!("Could not read dimensions of {}: {}", path_ref.display(), e);
            None
        }
    }
}
