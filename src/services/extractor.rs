// src/services/extractor.rs

//! Product field extraction.
//!
//! Every field is read independently and falls back to its sentinel when
//! the page does not carry it, so one missing element never costs the rest
//! of the record.

use std::sync::Arc;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::{AppError, Result};
use crate::models::{
    CompiledSelectors, Gender, GenderMarker, NOT_AVAILABLE, PolicyConfig, ProductRecord,
};
use crate::utils::text::{clean_text, normalize_whitespace, stripped_text};

/// Whole-word, case-insensitive match of product names against keywords.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new(keywords: &[String]) -> Result<Self> {
        if keywords.is_empty() {
            return Ok(Self { pattern: None });
        }
        let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k.trim())).collect();
        let source = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        let pattern = Regex::new(&source)
            .map_err(|e| AppError::config(format!("invalid keyword pattern: {e}")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(name))
    }
}

/// Reads product fields from a parsed page.
pub struct FieldExtractor {
    selectors: Arc<CompiledSelectors>,
    article_label: String,
    gender_markers: Vec<GenderMarker>,
    keywords: KeywordMatcher,
}

impl FieldExtractor {
    pub fn new(selectors: Arc<CompiledSelectors>, policy: &PolicyConfig) -> Result<Self> {
        Ok(Self {
            selectors,
            article_label: policy.article_label.clone(),
            gender_markers: policy.gender_markers.clone(),
            keywords: KeywordMatcher::new(&policy.suit_keywords)?,
        })
    }

    /// Build a record from the page; image fields stay at their sentinels.
    pub fn extract(&self, document: &Html, id: &str, url: &str) -> ProductRecord {
        let mut record = ProductRecord::sentinel(id, url);

        if let Some(brand) = self.brand(document) {
            record.brand = brand;
        }
        if let Some(name) = self.name(document) {
            record.name = name;
        }
        if let Some(article) = self.article(document) {
            record.article = article;
        }
        record.gender = self.gender(document);
        if let Some(description) = self.description(document) {
            record.description = description;
        }
        record.sizes = self.sizes(document);
        if let Some(color) = self.color(document) {
            record.color = color;
        }
        if let Some(category) = self.category(document) {
            record.category = category;
        }

        record
    }

    /// Whether the product name puts it into the suit category.
    pub fn is_suit(&self, name: &str) -> bool {
        name != NOT_AVAILABLE && self.keywords.is_match(name)
    }

    fn brand(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.selectors.brand).next()?;
        non_empty(stripped_text(element))
    }

    fn name(&self, document: &Html) -> Option<String> {
        let title = document.select(&self.selectors.title).next()?;
        let full: String = title.text().collect();
        let hidden: String = title
            .select(&self.selectors.title_hidden)
            .next()
            .map(|span| span.text().collect())
            .unwrap_or_default();

        let hidden = hidden.trim();
        let visible = if hidden.is_empty() {
            full
        } else {
            full.replace(hidden, "")
        };
        non_empty(clean_text(&normalize_whitespace(&visible)).trim().to_string())
    }

    fn article(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selectors.article_item)
            .map(stripped_text)
            .find(|text| text.contains(&self.article_label))
            .and_then(|text| {
                let value = text.replace(&self.article_label, "");
                non_empty(clean_text(value.trim()))
            })
    }

    fn gender(&self, document: &Html) -> Gender {
        self.breadcrumbs(document)
            .into_iter()
            .flat_map(|crumbs| crumbs.select(&self.selectors.breadcrumb_link))
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| self.gender_for_href(href))
            .last()
            .unwrap_or(Gender::Unknown)
    }

    fn gender_for_href(&self, href: &str) -> Option<Gender> {
        self.gender_markers
            .iter()
            .find(|marker| href.contains(&marker.pattern))
            .map(|marker| marker.gender)
    }

    fn description(&self, document: &Html) -> Option<String> {
        let section = document.select(&self.selectors.description_section).next()?;
        let paragraph = section
            .select(&self.selectors.description_paragraph)
            .next()?;
        non_empty(clean_text(&normalize_whitespace(&stripped_text(paragraph))))
    }

    fn sizes(&self, document: &Html) -> Vec<String> {
        let Some(container) = document.select(&self.selectors.sizes).next() else {
            return Vec::new();
        };

        container
            .select(&self.selectors.size_item)
            .filter(|item| !self.is_decoration(item))
            .filter_map(|item| item.select(&self.selectors.size_label).last())
            .map(|label| clean_text(&stripped_text(label)))
            .filter(|size| !size.is_empty())
            .collect()
    }

    fn is_decoration(&self, item: &ElementRef<'_>) -> bool {
        item.value().classes().any(|class| {
            self.selectors
                .size_excluded_classes
                .iter()
                .any(|excluded| excluded == class)
        })
    }

    fn color(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.selectors.color).next()?;
        non_empty(stripped_text(element))
    }

    fn category(&self, document: &Html) -> Option<String> {
        let crumbs = self.breadcrumbs(document)?;
        let last = crumbs.select(&self.selectors.breadcrumb_item).last()?;
        let link = last.select(&self.selectors.breadcrumb_link).next()?;
        non_empty(stripped_text(link))
    }

    fn breadcrumbs<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selectors.breadcrumbs).next()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageSelectors;

    const PAGE: &str = r#"
        <html><body>
          <span class="description__visuallyHidden____sjk5">Canali</span>
          <ul class="Breadcrumbs__breadcrumbs___dbDQw">
            <li><a href="/catalog/">Каталог</a></li>
            <li><a href="/catalog/muzhskoe-18/">Мужское</a></li>
            <li><a href="/catalog/muzhskoe-kostyumy-18/">Костюмы</a></li>
          </ul>
          <h1 data-test-id="productTitle">
            <span class="description__visuallyHidden____sjk5">Canali</span>
            Шерстяной костюм
          </h1>
          <ul class="Specs">
            <li>Состав: шерсть</li>
            <li>Артикул: CN-2024/01</li>
          </ul>
          <section class="SegmentsView__section___jGPx8" data-test-id="productInfoSectionWrapper">
            <p>  Классический крой,
               100% шерсть </p>
            <p>Second paragraph</p>
          </section>
          <ul class="Sizes__sizes___geUvy" data-test-id="productSizeWrapper">
            <li class="Sizes__sizesMobileTitle___skPu9"><span>Размер</span></li>
            <li class="Sizes__uppercase___U1DRS"><span>IT</span></li>
            <li><span>RU</span><span>48</span></li>
            <li><span>RU</span><span>50</span></li>
            <li><span>RU</span><span> </span></li>
          </ul>
          <span class="SingleColor__colorTitle___VTGcs">темно-синий</span>
        </body></html>
    "#;

    fn extractor() -> FieldExtractor {
        let selectors = Arc::new(PageSelectors::default().compile().unwrap());
        FieldExtractor::new(selectors, &PolicyConfig::default()).unwrap()
    }

    fn extract(html: &str) -> ProductRecord {
        let document = Html::parse_document(html);
        extractor().extract(&document, "100", "https://shop.example/product/100")
    }

    #[test]
    fn test_extract_full_page() {
        let record = extract(PAGE);
        assert_eq!(record.brand, "Canali");
        assert_eq!(record.name, "Шерстяной костюм");
        assert_eq!(record.article, "CN-2024/01");
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.description, "Классический крой, 100% шерсть");
        assert_eq!(record.sizes, vec!["48", "50"]);
        assert_eq!(record.color, "темно-синий");
        assert_eq!(record.category, "Костюмы");
        assert_eq!(record.main_image, NOT_AVAILABLE);
    }

    #[test]
    fn test_empty_page_yields_sentinels() {
        let record = extract("<html><body><p>nothing</p></body></html>");
        assert_eq!(
            record,
            ProductRecord::sentinel("100", "https://shop.example/product/100")
        );
    }

    #[test]
    fn test_missing_field_does_not_block_others() {
        let html = PAGE.replace("productTitle", "somethingElse");
        let record = extract(&html);
        assert_eq!(record.name, NOT_AVAILABLE);
        assert_eq!(record.article, "CN-2024/01");
        assert_eq!(record.sizes, vec!["48", "50"]);
    }

    #[test]
    fn test_name_without_hidden_span() {
        let record = extract(r#"<h1 data-test-id="productTitle">  Брюки  <b>slim</b></h1>"#);
        assert_eq!(record.name, "Брюки slim");
    }

    #[test]
    fn test_gender_uses_last_matching_breadcrumb() {
        let html = r#"
            <ul class="Breadcrumbs__breadcrumbs___dbDQw">
              <li><a href="/catalog/female-clothes/">Женское</a></li>
              <li><a href="/catalog/unisex-bags/">Сумки</a></li>
              <li><a href="/catalog/sale/">Sale</a></li>
            </ul>"#;
        let record = extract(html);
        assert_eq!(record.gender, Gender::Unisex);
        assert_eq!(record.category, "Sale");
    }

    #[test]
    fn test_female_marker_not_taken_for_male() {
        let html = r#"
            <ul class="Breadcrumbs__breadcrumbs___dbDQw">
              <li><a href="/catalog/female-dresses/">Платья</a></li>
            </ul>"#;
        assert_eq!(extract(html).gender, Gender::Female);
    }

    #[test]
    fn test_no_gender_marker() {
        let html = r#"
            <ul class="Breadcrumbs__breadcrumbs___dbDQw">
              <li><a href="/catalog/">Каталог</a></li>
            </ul>"#;
        assert_eq!(extract(html).gender, Gender::Unknown);
    }

    #[test]
    fn test_keyword_match_is_whole_word() {
        let extractor = extractor();
        assert!(extractor.is_suit("Шерстяной костюм"));
        assert!(extractor.is_suit("СМОКИНГ из шерсти"));
        assert!(!extractor.is_suit("Костюмчик"));
        assert!(!extractor.is_suit(NOT_AVAILABLE));
    }

    #[test]
    fn test_keyword_matcher_without_keywords() {
        let matcher = KeywordMatcher::new(&[]).unwrap();
        assert!(!matcher.is_match("костюм"));
    }
}
