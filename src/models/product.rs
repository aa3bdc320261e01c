//! Product record and related data structures.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder written when a field cannot be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column header of the CSV export, in output order.
pub const EXPORT_HEADER: [&str; 12] = [
    "URL",
    "ID",
    "Name",
    "Brand",
    "Article",
    "Gender",
    "Image",
    "Ext Images",
    "Description",
    "Sizes",
    "Color",
    "Category",
];

/// Full image sets of suit products, keyed by product name.
pub type SuitIndex = IndexMap<String, Vec<String>>;

/// Gender a product is catalogued under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unisex,
    #[default]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unisex => "unisex",
            Gender::Unknown => NOT_AVAILABLE,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog item queued for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// 1-based position of the identifier in the input file
    pub ordinal: usize,

    /// Catalog item identifier
    pub id: String,

    /// Product page URL
    pub url: String,
}

impl fmt::Display for BatchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.ordinal, self.id)
    }
}

/// Structured attributes scraped from one product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: String,
    pub url: String,
    pub brand: String,
    pub name: String,
    pub article: String,
    pub gender: Gender,
    pub description: String,
    pub sizes: Vec<String>,
    pub color: String,
    pub category: String,
    pub main_image: String,
    pub extra_images: Vec<String>,
}

impl ProductRecord {
    /// A record with every field at its sentinel, carrying only id and url.
    pub fn sentinel(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            brand: NOT_AVAILABLE.to_string(),
            name: NOT_AVAILABLE.to_string(),
            article: NOT_AVAILABLE.to_string(),
            gender: Gender::Unknown,
            description: String::new(),
            sizes: Vec::new(),
            color: String::new(),
            category: NOT_AVAILABLE.to_string(),
            main_image: NOT_AVAILABLE.to_string(),
            extra_images: Vec::new(),
        }
    }

    /// Whether a product name was extracted.
    pub fn has_name(&self) -> bool {
        self.name != NOT_AVAILABLE
    }

    /// Render the record as an export row, matching [`EXPORT_HEADER`].
    pub fn to_row(&self) -> [String; 12] {
        [
            self.url.clone(),
            self.id.clone(),
            self.name.clone(),
            self.brand.clone(),
            self.article.clone(),
            self.gender.to_string(),
            self.main_image.clone(),
            self.extra_images.join(","),
            self.description.clone(),
            self.sizes.join(","),
            self.color.clone(),
            self.category.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_record() {
        let record = ProductRecord::sentinel("42", "https://example.com/product/42");
        assert_eq!(record.id, "42");
        assert_eq!(record.name, NOT_AVAILABLE);
        assert_eq!(record.main_image, NOT_AVAILABLE);
        assert_eq!(record.gender, Gender::Unknown);
        assert!(record.description.is_empty());
        assert!(!record.has_name());
    }

    #[test]
    fn test_row_joins_lists() {
        let mut record = ProductRecord::sentinel("7", "https://example.com/product/7");
        record.name = "Пиджак".to_string();
        record.gender = Gender::Male;
        record.sizes = vec!["46".to_string(), "48".to_string()];
        record.extra_images = vec!["a.jpg".to_string(), "b.jpg".to_string()];

        let row = record.to_row();
        assert_eq!(row[2], "Пиджак");
        assert_eq!(row[5], "male");
        assert_eq!(row[7], "a.jpg,b.jpg");
        assert_eq!(row[9], "46,48");
    }

    #[test]
    fn test_gender_serde_lowercase() {
        let gender: Gender = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(gender, Gender::Female);
        assert_eq!(Gender::Unknown.to_string(), "N/A");
    }
}
