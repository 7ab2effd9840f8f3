#![allow(dead_code)]

pub mod test_images;
pub use test_images::*;

use photo_organizer_core::download::{DownloadFailure, FetchedResource};
use photo_organizer_core::Fetch;
use std::collections::HashMap;

/// Offline transport serving canned bodies by URL
#[derive(Default)]
pub struct FakeWeb {
    pages: HashMap<String, (u16, String, Vec<u8>)>,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(mut self, url: &str, body: Vec<u8>) -> Self {
        self.pages
            .insert(url.to_string(), (200, "image/png".to_string(), body));
        self
    }

    pub fn missing(mut self, url: &str) -> Self {
        self.pages
            .insert(url.to_string(), (404, "text/html".to_string(), b"not found".to_vec()));
        self
    }
}

impl Fetch for FakeWeb {
    fn fetch(&self, url: &str) -> Result<FetchedResource, DownloadFailure> {
        match self.pages.get(url) {
            Some((status, content_type, body)) => Ok(FetchedResource {
                status: *status,
                content_type: Some(content_type.clone()),
                body: body.clone(),
            }),
            None => Err(DownloadFailure::Network(format!("no route to {}", url))),
        }
    }
}
