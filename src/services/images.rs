// src/services/images.rs

//! Product image discovery, selection and download.
//!
//! Suit pages keep every carousel image; all other pages keep at most the
//! first four slides, dropping the leading hero shot when exactly four are
//! present. The kept sequence is deduplicated in first-seen order before
//! the export picks its main and extra images by position.

use std::sync::Arc;

use indexmap::IndexSet;
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::error::AppError;
use crate::models::{CompiledSelectors, NOT_AVAILABLE};
use crate::storage::ProductStorage;
use crate::utils::{http, resolve_url};

/// Slides examined on pages outside the suit category.
const REGULAR_SLIDE_LIMIT: usize = 4;

/// Main and extra images chosen for the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    pub main: String,
    pub extras: Vec<String>,
}

/// Pick the export images from a deduplicated sequence.
///
/// | n  | main     | extras       |
/// |----|----------|--------------|
/// | 0  | N/A      | -            |
/// | 1  | [0]      | -            |
/// | 2  | [1]      | [0]          |
/// | 3  | [1]      | [0], [2]     |
/// | 4+ | [2]      | [1], [3]     |
pub fn select_images(images: &[String]) -> ImageSelection {
    let pick = |main: usize, extras: &[usize]| ImageSelection {
        main: images[main].clone(),
        extras: extras.iter().map(|&i| images[i].clone()).collect(),
    };

    match images.len() {
        0 => ImageSelection {
            main: NOT_AVAILABLE.to_string(),
            extras: Vec::new(),
        },
        1 => pick(0, &[]),
        2 => pick(1, &[0]),
        3 => pick(1, &[0, 2]),
        _ => pick(2, &[1, 3]),
    }
}

/// Choose which slides to keep and collapse duplicate URLs.
///
/// `slides` holds one entry per carousel slide in document order, `None`
/// for slides without a usable image.
pub fn keep_images(slides: &[Option<String>], is_suit: bool) -> Vec<String> {
    let candidates: Box<dyn Iterator<Item = &Option<String>>> = if is_suit {
        Box::new(slides.iter())
    } else {
        let skip = usize::from(slides.len() == REGULAR_SLIDE_LIMIT);
        Box::new(slides.iter().take(REGULAR_SLIDE_LIMIT).skip(skip))
    };

    candidates
        .flatten()
        .cloned()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Finds, downloads and stores product images.
pub struct ImageEngine {
    client: Client,
    selectors: Arc<CompiledSelectors>,
    storage: Arc<dyn ProductStorage>,
}

impl ImageEngine {
    pub fn new(
        client: Client,
        selectors: Arc<CompiledSelectors>,
        storage: Arc<dyn ProductStorage>,
    ) -> Self {
        Self {
            client,
            selectors,
            storage,
        }
    }

    /// Image URL of every slide, resolved against the page URL.
    pub fn discover(&self, document: &Html, page_url: &str) -> Vec<Option<String>> {
        let base = Url::parse(page_url).ok();

        document
            .select(&self.selectors.slide)
            .map(|slide| {
                let image = slide.select(&self.selectors.slide_image).next()?;
                let element = image.value();
                let src = element
                    .attr(&self.selectors.lazy_src_attr)
                    .or_else(|| element.attr(&self.selectors.src_attr))?
                    .trim();
                if src.is_empty() {
                    return None;
                }
                Some(match &base {
                    Some(base) => resolve_url(base, src),
                    None => src.to_string(),
                })
            })
            .collect()
    }

    /// Download the kept images into the product's directory.
    ///
    /// Failed downloads are skipped; returns how many files were written.
    pub async fn persist(&self, images: &[String], ordinal: usize, name: &str) -> usize {
        let mut saved = 0;

        for (index, url) in images.iter().enumerate() {
            let position = index + 1;
            let bytes = match http::fetch_bytes(&self.client, url).await {
                Ok(bytes) => bytes,
                Err(AppError::Status { status, .. }) => {
                    log::debug!("Image {} skipped (status {})", url, status);
                    continue;
                }
                Err(error) => {
                    log::warn!("Image {} skipped: {}", url, error);
                    continue;
                }
            };

            match self.storage.save_image(ordinal, name, position, &bytes).await {
                Ok(location) => {
                    log::debug!("Saved {}", location);
                    saved += 1;
                }
                Err(error) => log::warn!("Failed to store image {}: {}", url, error),
            }
        }

        saved
    }
}
