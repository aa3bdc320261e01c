//! Storage abstractions for scrape results.
//!
//! ## Layout
//!
//! ```text
//! {cwd}/
//! ├── product.csv               # Export: one row per accepted product
//! ├── suits.json                # Side-index: suit name → image URLs
//! └── images/                   # Cleared at the start of every run
//!     └── {ordinal}. {name}/
//!         ├── image1.jpg
//!         └── image2.jpg
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProductRecord, SuitIndex};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for result storage backends.
#[async_trait]
pub trait ProductStorage: Send + Sync {
    /// Remove every previously downloaded image.
    async fn reset_images(&self) -> Result<()>;

    /// Store one product image, returning its location.
    ///
    /// `position` is the 1-based index of the image within the product's
    /// kept sequence.
    async fn save_image(
        &self,
        ordinal: usize,
        name: &str,
        position: usize,
        bytes: &[u8],
    ) -> Result<String>;

    /// Write the export, replacing any previous one.
    async fn write_export(&self, records: &[ProductRecord]) -> Result<String>;

    /// Write the suit side-index.
    ///
    /// An empty index removes the file instead, so its absence signals that
    /// no suits were found. Returns the location when a file was written.
    async fn write_suit_index(&self, index: &SuitIndex) -> Result<Option<String>>;
}
