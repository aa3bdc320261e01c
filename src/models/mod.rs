// src/models/mod.rs

//! Domain models for the scraper application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod product;
mod selectors;

// Re-export all public types
pub use config::{
    CatalogConfig, Config, CrawlerConfig, GenderMarker, LoggingConfig, PathsConfig, PolicyConfig,
};
pub use product::{BatchItem, EXPORT_HEADER, Gender, NOT_AVAILABLE, ProductRecord, SuitIndex};
pub use selectors::{CompiledSelectors, PageSelectors};
