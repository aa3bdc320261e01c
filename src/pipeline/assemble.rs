// src/pipeline/assemble.rs

//! Turns coordinator slots into the export rows and suit index.

use crate::models::{Gender, ProductRecord, SuitIndex};

/// Outcome of processing one batch item.
#[derive(Debug, Clone)]
pub struct ItemResult {
    pub record: ProductRecord,
    /// Suit name and its full image set, for keyword-matching products
    pub suit_entry: Option<(String, Vec<String>)>,
    /// The page could not be fetched
    pub degraded: bool,
    pub images_saved: usize,
}

impl ItemResult {
    /// Result for an item whose page fetch failed.
    pub fn degraded(record: ProductRecord) -> Self {
        Self {
            record,
            suit_entry: None,
            degraded: true,
            images_saved: 0,
        }
    }
}

/// Rows and side-index ready to be written.
#[derive(Debug, Default)]
pub struct Assembly {
    pub records: Vec<ProductRecord>,
    pub suits: SuitIndex,
    pub degraded: usize,
    pub images_saved: usize,
    pub filtered_unisex: usize,
    pub filtered_unnamed: usize,
}

/// Walk slots in input order, merge suit entries and filter rows.
///
/// Suit entries are merged before filtering, so a unisex suit still appears
/// in the index. A repeated name replaces the earlier image list but keeps
/// its position.
pub fn assemble(slots: Vec<Option<ItemResult>>) -> Assembly {
    let mut assembly = Assembly::default();

    for result in slots.into_iter().flatten() {
        if result.degraded {
            assembly.degraded += 1;
        }
        assembly.images_saved += result.images_saved;

        if let Some((name, images)) = result.suit_entry {
            assembly.suits.insert(name, images);
        }

        let record = result.record;
        if record.gender == Gender::Unisex {
            log::debug!("Filtered unisex product {}", record.id);
            assembly.filtered_unisex += 1;
            continue;
        }
        if !record.has_name() {
            log::debug!("Filtered product {} without a name", record.id);
            assembly.filtered_unnamed += 1;
            continue;
        }
        assembly.records.push(record);
    }

    assembly
}
