//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Scrape product pages and write the export
//! - `fetch_known_ids`: Collect identifiers already in the remote catalog

pub mod assemble;
pub mod coordinator;
pub mod scrape;

pub use coordinator::{Coordinator, CoordinatorReport, TaskOutcome};
pub use scrape::{RunSummary, ScrapeOptions, Scraper, fetch_known_ids, run_scrape};
