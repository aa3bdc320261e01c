//! Service layer for the scraper application.
//!
//! This module contains the business logic for:
//! - Identifier loading and local dedup (`IdentifierSource`)
//! - Remote catalog lookup (`CatalogDeduper`)
//! - Page retrieval (`PageFetcher`)
//! - Field extraction (`FieldExtractor`)
//! - Image selection and download (`ImageEngine`)

mod catalog;
mod extractor;
mod fetcher;
mod identifiers;
mod images;

pub use catalog::CatalogDeduper;
pub use extractor::{FieldExtractor, KeywordMatcher};
pub use fetcher::PageFetcher;
pub use identifiers::{BatchPlan, IdentifierList, IdentifierSource, plan_batch};
pub use images::{ImageEngine, ImageSelection, keep_images, select_images};
