// src/pipeline/scrape.rs

//! Product scraping pipeline.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::Html;

use crate::error::Result;
use crate::models::{BatchItem, Config, ProductRecord};
use crate::pipeline::assemble::{ItemResult, assemble};
use crate::pipeline::coordinator::Coordinator;
use crate::services::{
    CatalogDeduper, FieldExtractor, IdentifierSource, ImageEngine, PageFetcher, keep_images,
    plan_batch, select_images,
};
use crate::storage::ProductStorage;
use crate::utils::http::create_async_client;

/// Per-run switches supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Read identifiers from this file instead of the configured one
    pub ids_file: Option<PathBuf>,
    /// Do not consult the remote catalog
    pub skip_known: bool,
}

/// Counters describing one scrape run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_input: usize,
    pub empty_lines: usize,
    pub duplicates: usize,
    pub known: usize,
    pub dispatched: usize,
    pub degraded: usize,
    pub timed_out: usize,
    pub retried: usize,
    pub filtered_unisex: usize,
    pub filtered_unnamed: usize,
    pub exported: usize,
    pub suit_entries: usize,
    pub images_saved: usize,
    pub export_location: String,
    pub suits_location: Option<String>,
}

impl RunSummary {
    fn log(&self) {
        log::info!("Scrape finished in {}s", (self.end_time - self.start_time).num_seconds());
        log::info!("  Identifiers read:     {}", self.total_input);
        log::info!("  Empty lines skipped:  {}", self.empty_lines);
        log::info!("  Duplicates skipped:   {}", self.duplicates);
        log::info!("  Already in catalog:   {}", self.known);
        log::info!("  Dispatched:           {}", self.dispatched);
        log::info!("  Failed page fetches:  {}", self.degraded);
        log::info!("  Timed out:            {}", self.timed_out);
        log::info!("  Retried:              {}", self.retried);
        log::info!("  Filtered (unisex):    {}", self.filtered_unisex);
        log::info!("  Filtered (no name):   {}", self.filtered_unnamed);
        log::info!("  Exported:             {}", self.exported);
        log::info!("  Suit entries:         {}", self.suit_entries);
        log::info!("  Images saved:         {}", self.images_saved);
    }
}

/// Fetches and processes one product page.
pub struct Scraper {
    fetcher: PageFetcher,
    extractor: FieldExtractor,
    images: ImageEngine,
}

impl Scraper {
    pub fn new(config: &Config, client: Client, storage: Arc<dyn ProductStorage>) -> Result<Self> {
        let selectors = Arc::new(config.selectors.compile()?);
        Ok(Self {
            fetcher: PageFetcher::new(client.clone(), &config.crawler.fallback_encoding),
            extractor: FieldExtractor::new(Arc::clone(&selectors), &config.policy)?,
            images: ImageEngine::new(client, selectors, storage),
        })
    }

    /// Scrape one item. Failures degrade the record instead of erroring.
    pub async fn process(&self, item: BatchItem) -> ItemResult {
        let page = match self.fetcher.fetch(&item.url).await {
            Ok(page) => page,
            Err(error) => {
                log::warn!("Failed to fetch {} {}: {}", item, item.url, error);
                return ItemResult::degraded(ProductRecord::sentinel(item.id, item.url));
            }
        };

        let (mut record, kept, is_suit) = {
            let document = Html::parse_document(&page);
            let record = self.extractor.extract(&document, &item.id, &item.url);
            let is_suit = self.extractor.is_suit(&record.name);
            let slides = self.images.discover(&document, &item.url);
            (record, keep_images(&slides, is_suit), is_suit)
        };

        let selection = select_images(&kept);
        record.main_image = selection.main;
        record.extra_images = selection.extras;

        let images_saved = self.images.persist(&kept, item.ordinal, &record.name).await;
        log::debug!(
            "Scraped {}: '{}', {} of {} images saved",
            item,
            record.name,
            images_saved,
            kept.len()
        );

        ItemResult {
            suit_entry: is_suit.then(|| (record.name.clone(), kept)),
            record,
            degraded: false,
            images_saved,
        }
    }
}

/// Fetch the identifiers already present in the remote catalog.
///
/// Returns an empty set when the catalog lookup is disabled.
pub async fn fetch_known_ids(config: &Config, client: &Client) -> Result<HashSet<String>> {
    if !config.catalog.enabled {
        log::info!("Catalog lookup disabled");
        return Ok(HashSet::new());
    }
    CatalogDeduper::new(client, &config.catalog)
        .fetch_known_ids()
        .await
}

/// Run one scrape: read identifiers, scrape new items, write the results.
pub async fn run_scrape(
    config: &Config,
    storage: Arc<dyn ProductStorage>,
    options: &ScrapeOptions,
) -> Result<RunSummary> {
    let start_time = Utc::now();
    log::info!("Starting scrape");

    let client = create_async_client(&config.crawler)?;
    let scraper = Scraper::new(config, client.clone(), Arc::clone(&storage))?;

    let ids_file = options
        .ids_file
        .as_ref()
        .unwrap_or(&config.paths.ids_file);
    let list = IdentifierSource::new(&config.crawler.base_url).load(ids_file)?;
    let total_input = list.items.len();
    log::info!("Loaded {} identifiers from {}", total_input, ids_file.display());

    let known = if options.skip_known {
        HashSet::new()
    } else {
        fetch_known_ids(config, &client).await?
    };

    storage.reset_images().await?;

    let plan = plan_batch(list.items, &known);
    let dispatched = plan.items.len();
    log::info!(
        "Dispatching {} items ({} duplicates, {} already in catalog)",
        dispatched,
        plan.duplicates,
        plan.known
    );

    let scraper = &scraper;
    let report = Coordinator::from_config(config)
        .run(plan.items, |item| scraper.process(item))
        .await;

    let assembly = assemble(report.slots);
    let export_location = storage.write_export(&assembly.records).await?;
    let suits_location = storage.write_suit_index(&assembly.suits).await?;

    let summary = RunSummary {
        start_time,
        end_time: Utc::now(),
        total_input,
        empty_lines: list.empty_lines,
        duplicates: plan.duplicates,
        known: plan.known,
        dispatched,
        degraded: assembly.degraded,
        timed_out: report.timed_out.len(),
        retried: report.retried,
        filtered_unisex: assembly.filtered_unisex,
        filtered_unnamed: assembly.filtered_unnamed,
        exported: assembly.records.len(),
        suit_entries: assembly.suits.len(),
        images_saved: assembly.images_saved,
        export_location,
        suits_location,
    };
    summary.log();

    Ok(summary)
}
