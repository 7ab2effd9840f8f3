use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the photo-organizer library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// File or directory not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Rejected user input (date range, photo set)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Two photos would land on the same organized filename
    #[error(
        "Filename collision on '{file_name}': {} and {}",
        .first.display(),
        .second.display()
    )]
    NameCollision {
        file_name: String,
        first: PathBuf,
        second: PathBuf,
    },
}
