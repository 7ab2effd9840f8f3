//! Places sequenced photos into the organized directory.
//!
//! Photos are copied: the staged originals stay in the raw directory as the
//! source of truth. An existing organized file is never overwritten.

use log::{error, info};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::processing::compute_cryptographic;
use crate::types::PhotoRecord;

/// Two sources competing for one organized filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub file_name: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

impl From<Collision> for Error {
    fn from(c: Collision) -> Self {
        Error::NameCollision {
            file_name: c.file_name,
            first: c.first,
            second: c.second,
        }
    }
}

/// What happened to each photo handed to the organizer
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Newly written organized files
    pub organized: Vec<PathBuf>,

    /// Destinations that already held identical content
    pub already_present: Vec<PathBuf>,

    /// Photos left out because their name was taken by different content
    pub collisions: Vec<Collision>,
}

impl OrganizeReport {
    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty()
    }
}

pub struct Organizer {
    output_dir: PathBuf,
}

impl Organizer {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Fail if two photos of the plan share a final name or one has none
    pub fn check_plan(photos: &[PhotoRecord]) -> Result<()> {
        let mut owners: HashMap<&str, &Path> = HashMap::new();

        for photo in photos {
            let name = photo.final_name.as_deref().ok_or_else(|| {
                Error::Validation(format!(
                    "{} has not been sequenced",
                    photo.staged_path.display()
                ))
            })?;

            if let Some(first) = owners.insert(name, &photo.staged_path) {
                return Err(Collision {
                    file_name: name.to_string(),
                    first: first.to_path_buf(),
                    second: photo.staged_path.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Copy every sequenced photo into the output directory.
    ///
    /// A clash inside the plan aborts before any file is written. A clash
    /// with a file already in the output directory only skips that photo.
    pub fn organize(&self, photos: &[PhotoRecord]) -> Result<OrganizeReport> {
        Self::check_plan(photos)?;
        std::fs::create_dir_all(&self.output_dir)?;

        let mut report = OrganizeReport::default();
        for photo in photos {
            // check_plan guarantees a name
            let Some(name) = photo.final_name.as_deref() else {
                continue;
            };
            let dest = self.output_dir.join(name);

            match copy_new(&photo.staged_path, &dest) {
                Ok(_) => {
                    log_fs_modification("organize", &dest, Some(&photo.staged_path.display().to_string()));
                    report.organized.push(dest);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if same_content(&photo.staged_path, &dest)? {
                        report.already_present.push(dest);
                    } else {
                        let collision = Collision {
                            file_name: name.to_string(),
                            first: dest,
                            second: photo.staged_path.clone(),
                        };
                        error!("{}", Error::from(collision.clone()));
                        report.collisions.push(collision);
                    }
                }
                Err(e) => {
                    log_file_error(&photo.staged_path, "copy", &e);
                    return Err(e.into());
                }
            }
        }

        info!(
            "Organized {} photos into {} ({} already present, {} collisions)",
            report.organized.len(),
            self.output_dir.display(),
            report.already_present.len(),
            report.collisions.len()
        );
        Ok(report)
    }
}

/// Copy to a destination that must not exist yet
fn copy_new(src: &Path, dest: &Path) -> io::Result<u64> {
    let mut input = File::open(src)?;
    let mut output = OpenOptions::new().write(true).create_new(true).open(dest)?;

    match io::copy(&mut input, &mut output) {
        Ok(n) => Ok(n),
        Err(e) => {
            drop(output);
            let _ = std::fs::remove_file(dest);
            // Report as a plain failure, not as a name clash
            Err(io::Error::new(ErrorKind::Other, e))
        }
    }
}

fn same_content(a: &Path, b: &Path) -> Result<bool> {
    Ok(compute_cryptographic(a)? == compute_cryptographic(b)?)
}
