//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Gender, PageSelectors};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and task scheduling settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Remote catalog used to skip already-ingested items
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Markup locators for product pages
    #[serde(default)]
    pub selectors: PageSelectors,

    /// Extraction and image selection rules
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging behavior
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.task_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.task_timeout_secs must be > 0",
            ));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        url::Url::parse(&self.crawler.base_url)
            .map_err(|e| AppError::validation(format!("crawler.base_url: {e}")))?;
        if encoding_rs::Encoding::for_label(self.crawler.fallback_encoding.as_bytes()).is_none() {
            return Err(AppError::validation(format!(
                "crawler.fallback_encoding '{}' is not a known encoding",
                self.crawler.fallback_encoding
            )));
        }
        if self.catalog.enabled {
            url::Url::parse(&self.catalog.api_url)
                .map_err(|e| AppError::validation(format!("catalog.api_url: {e}")))?;
            if self.catalog.company_id.trim().is_empty() {
                return Err(AppError::validation("catalog.company_id is empty"));
            }
            if self.catalog.limit == 0 {
                return Err(AppError::validation("catalog.limit must be > 0"));
            }
            if self.catalog.max_pages == 0 {
                return Err(AppError::validation("catalog.max_pages must be > 0"));
            }
        }
        if self.policy.suit_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::validation("policy.suit_keywords has a blank entry"));
        }
        if self.policy.gender_markers.iter().any(|m| m.pattern.is_empty()) {
            return Err(AppError::validation(
                "policy.gender_markers has an empty pattern",
            ));
        }
        self.selectors.compile()?;
        Ok(())
    }
}

/// HTTP client and task scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Product page URL prefix; the item identifier is appended verbatim
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Extra browser-like headers sent with every page request
    #[serde(default = "defaults::headers")]
    pub headers: IndexMap<String, String>,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Upper bound for one item's whole task (page, extraction, images)
    #[serde(default = "defaults::task_timeout")]
    pub task_timeout_secs: u64,

    /// How many times a timed-out task is started again
    #[serde(default = "defaults::task_retries")]
    pub task_retries: u32,

    /// Worker pool width
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Optional proxy URL applied to every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Encoding assumed when a page is neither declared nor valid UTF-8
    #[serde(default = "defaults::fallback_encoding")]
    pub fallback_encoding: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            headers: defaults::headers(),
            timeout_secs: defaults::timeout(),
            task_timeout_secs: defaults::task_timeout(),
            task_retries: defaults::task_retries(),
            max_concurrent: defaults::max_concurrent(),
            proxy: None,
            fallback_encoding: defaults::fallback_encoding(),
        }
    }
}

/// Remote catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Skip the remote lookup entirely when false
    #[serde(default = "defaults::catalog_enabled")]
    pub enabled: bool,

    /// Paginated endpoint listing ingested items
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    #[serde(default = "defaults::company_id")]
    pub company_id: String,

    /// Page size requested from the endpoint
    #[serde(default = "defaults::limit")]
    pub limit: u32,

    /// Pagination safety cap
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::catalog_enabled(),
            api_url: defaults::api_url(),
            company_id: defaults::company_id(),
            limit: defaults::limit(),
            max_pages: defaults::max_pages(),
        }
    }
}

/// Input and output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Newline-delimited identifiers
    #[serde(default = "defaults::ids_file")]
    pub ids_file: PathBuf,

    /// CSV export
    #[serde(default = "defaults::export_file")]
    pub export_file: PathBuf,

    /// Suit image index (JSON)
    #[serde(default = "defaults::suits_file")]
    pub suits_file: PathBuf,

    /// Root of the downloaded image tree, cleared on every run
    #[serde(default = "defaults::images_dir")]
    pub images_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ids_file: defaults::ids_file(),
            export_file: defaults::export_file(),
            suits_file: defaults::suits_file(),
            images_dir: defaults::images_dir(),
        }
    }
}

/// Extraction and image selection rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whole words that put a product into the suit category
    #[serde(default = "defaults::suit_keywords")]
    pub suit_keywords: Vec<String>,

    /// Label preceding the article number
    #[serde(default = "defaults::article_label")]
    pub article_label: String,

    /// Breadcrumb href markers, checked in order
    #[serde(default = "defaults::gender_markers")]
    pub gender_markers: Vec<GenderMarker>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            suit_keywords: defaults::suit_keywords(),
            article_label: defaults::article_label(),
            gender_markers: defaults::gender_markers(),
        }
    }
}

/// Maps a breadcrumb href substring to a gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderMarker {
    pub pattern: String,
    pub gender: Gender,
}

impl GenderMarker {
    fn new(pattern: &str, gender: Gender) -> Self {
        Self {
            pattern: pattern.to_string(),
            gender,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Log completed/total while tasks run
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_progress: defaults::show_progress(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use indexmap::IndexMap;

    use super::GenderMarker;
    use crate::models::Gender;

    // Crawler defaults
    pub fn base_url() -> String {
        "https://www.tsum.ru/product/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/117.0".into()
    }
    pub fn headers() -> IndexMap<String, String> {
        [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Sec-Fetch-User", "?1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn task_timeout() -> u64 {
        10
    }
    pub fn task_retries() -> u32 {
        1
    }
    pub fn max_concurrent() -> usize {
        20
    }
    pub fn fallback_encoding() -> String {
        "windows-1251".into()
    }

    // Catalog defaults
    pub fn catalog_enabled() -> bool {
        true
    }
    pub fn api_url() -> String {
        "https://prod.api-landing.com/api/get_company_items".into()
    }
    pub fn company_id() -> String {
        "tsum_cs".into()
    }
    pub fn limit() -> u32 {
        10_000
    }
    pub fn max_pages() -> u32 {
        10_000
    }

    // Path defaults
    pub fn ids_file() -> PathBuf {
        "IDs.txt".into()
    }
    pub fn export_file() -> PathBuf {
        "product.csv".into()
    }
    pub fn suits_file() -> PathBuf {
        "suits.json".into()
    }
    pub fn images_dir() -> PathBuf {
        "images".into()
    }

    // Policy defaults
    pub fn suit_keywords() -> Vec<String> {
        vec!["костюм".into(), "смокинг".into()]
    }
    pub fn article_label() -> String {
        "Артикул:".into()
    }
    pub fn gender_markers() -> Vec<GenderMarker> {
        // "female-" before "male-": the latter is a substring of the former.
        vec![
            GenderMarker::new("female-", Gender::Female),
            GenderMarker::new("zhenskoe-", Gender::Female),
            GenderMarker::new("male-", Gender::Male),
            GenderMarker::new("muzhskoe-", Gender::Male),
            GenderMarker::new("unisex-", Gender::Unisex),
        ]
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_progress() -> bool {
        true
    }
}
