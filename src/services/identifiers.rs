// src/services/identifiers.rs

//! Identifier input loading and batch planning.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::BatchItem;

/// Identifiers read from the input file, in file order.
#[derive(Debug, Default)]
pub struct IdentifierList {
    pub items: Vec<BatchItem>,
    /// Blank lines skipped while reading
    pub empty_lines: usize,
}

/// Items left to dispatch after deduplication.
#[derive(Debug, Default)]
pub struct BatchPlan {
    pub items: Vec<BatchItem>,
    /// Identifiers repeated earlier in the same input
    pub duplicates: usize,
    /// Identifiers already present in the remote catalog
    pub known: usize,
}

/// Reads product identifiers and builds their page URLs.
pub struct IdentifierSource {
    base_url: String,
}

impl IdentifierSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Load identifiers from a newline-delimited file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<IdentifierList> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AppError::input(path, e))?;
        self.parse(&content)
    }

    /// Parse newline-delimited identifiers.
    pub fn parse(&self, content: &str) -> Result<IdentifierList> {
        let mut ids = Vec::new();
        let mut empty_lines = 0;
        for line in content.lines() {
            let id = line.trim();
            if id.is_empty() {
                empty_lines += 1;
                continue;
            }
            ids.push(id.to_string());
        }

        let urls: Vec<String> = ids.iter().map(|id| self.url_for(id)).collect();
        if urls.len() != ids.len() {
            return Err(AppError::validation(format!(
                "identifier count {} does not match URL count {}",
                ids.len(),
                urls.len()
            )));
        }

        if empty_lines > 0 {
            log::debug!("Skipped {} empty lines in identifier input", empty_lines);
        }

        let items = ids
            .into_iter()
            .zip(urls)
            .enumerate()
            .map(|(index, (id, url))| BatchItem {
                ordinal: index + 1,
                id,
                url,
            })
            .collect();

        Ok(IdentifierList { items, empty_lines })
    }

    /// Product page URL for an identifier.
    pub fn url_for(&self, id: &str) -> String {
        format!("{}{}", self.base_url, id)
    }
}

/// Drop repeated identifiers (first occurrence wins) and those already known.
pub fn plan_batch(items: Vec<BatchItem>, known: &HashSet<String>) -> BatchPlan {
    let mut seen = HashSet::with_capacity(items.len());
    let mut plan = BatchPlan::default();

    for item in items {
        if !seen.insert(item.id.clone()) {
            log::debug!("Duplicate identifier skipped: {}", item.id);
            plan.duplicates += 1;
            continue;
        }
        if known.contains(&item.id) {
            log::debug!("Identifier already in catalog: {}", item.id);
            plan.known += 1;
            continue;
        }
        plan.items.push(item);
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source() -> IdentifierSource {
        IdentifierSource::new("https://shop.example/product/")
    }

    #[test]
    fn test_parse_trims_and_skips_empty() {
        let list = source().parse("  101 \n\n102\r\n   \n103").unwrap();
        let ids: Vec<_> = list.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["101", "102", "103"]);
        assert_eq!(list.empty_lines, 2);
        assert_eq!(list.items[1].url, "https://shop.example/product/102");
        assert_eq!(list.items[2].ordinal, 3);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = source().load(tmp.path().join("IDs.txt")).unwrap_err();
        assert!(matches!(err, AppError::Input { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("IDs.txt");
        fs::write(&path, "a1\nb2\n").unwrap();
        let list = source().load(&path).unwrap();
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn test_plan_batch_first_occurrence_wins() {
        let list = source().parse("1\n2\n1\n3\n2").unwrap();
        let plan = plan_batch(list.items, &HashSet::new());

        let kept: Vec<_> = plan.items.iter().map(|i| (i.ordinal, i.id.as_str())).collect();
        assert_eq!(kept, vec![(1, "1"), (2, "2"), (4, "3")]);
        assert_eq!(plan.duplicates, 2);
        assert_eq!(plan.known, 0);
    }

    #[test]
    fn test_plan_batch_excludes_known() {
        let list = source().parse("1\n2\n3").unwrap();
        let known: HashSet<String> = ["2".to_string()].into_iter().collect();
        let plan = plan_batch(list.items, &known);

        assert!(plan.items.iter().all(|i| i.id != "2"));
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.known, 1);
    }
}
