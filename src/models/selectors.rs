// src/models/selectors.rs

//! Markup locators for scraping a product page.
//!
//! Every logical field maps to one entry here, so a change in the site's
//! markup is a configuration update rather than a code change.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors and attribute names used to read a product page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSelectors {
    /// Brand label
    #[serde(default = "defaults::brand")]
    pub brand: String,

    /// Product title
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Accessibility-only span nested in the title, subtracted from the name
    #[serde(default = "defaults::title_hidden")]
    pub title_hidden: String,

    /// Specification list items, one of which carries the article label
    #[serde(default = "defaults::article_item")]
    pub article_item: String,

    /// Breadcrumb list
    #[serde(default = "defaults::breadcrumbs")]
    pub breadcrumbs: String,

    /// Entry within the breadcrumb list
    #[serde(default = "defaults::breadcrumb_item")]
    pub breadcrumb_item: String,

    /// Anchor within a breadcrumb entry
    #[serde(default = "defaults::breadcrumb_link")]
    pub breadcrumb_link: String,

    /// Product info section holding the description
    #[serde(default = "defaults::description_section")]
    pub description_section: String,

    /// Paragraph inside the info section
    #[serde(default = "defaults::description_paragraph")]
    pub description_paragraph: String,

    /// Size list container
    #[serde(default = "defaults::sizes")]
    pub sizes: String,

    /// Entry within the size list
    #[serde(default = "defaults::size_item")]
    pub size_item: String,

    /// Inline element holding the size token (the last one wins)
    #[serde(default = "defaults::size_label")]
    pub size_label: String,

    /// Size entries carrying one of these classes are decorations
    #[serde(default = "defaults::size_excluded_classes")]
    pub size_excluded_classes: Vec<String>,

    /// Single color label
    #[serde(default = "defaults::color")]
    pub color: String,

    /// Image carousel slide
    #[serde(default = "defaults::slide")]
    pub slide: String,

    /// Image inside a slide
    #[serde(default = "defaults::slide_image")]
    pub slide_image: String,

    /// Lazy-load image URL attribute, preferred when present
    #[serde(default = "defaults::lazy_src_attr")]
    pub lazy_src_attr: String,

    /// Plain image URL attribute
    #[serde(default = "defaults::src_attr")]
    pub src_attr: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            brand: defaults::brand(),
            title: defaults::title(),
            title_hidden: defaults::title_hidden(),
            article_item: defaults::article_item(),
            breadcrumbs: defaults::breadcrumbs(),
            breadcrumb_item: defaults::breadcrumb_item(),
            breadcrumb_link: defaults::breadcrumb_link(),
            description_section: defaults::description_section(),
            description_paragraph: defaults::description_paragraph(),
            sizes: defaults::sizes(),
            size_item: defaults::size_item(),
            size_label: defaults::size_label(),
            size_excluded_classes: defaults::size_excluded_classes(),
            color: defaults::color(),
            slide: defaults::slide(),
            slide_image: defaults::slide_image(),
            lazy_src_attr: defaults::lazy_src_attr(),
            src_attr: defaults::src_attr(),
        }
    }
}

impl PageSelectors {
    /// Parse every locator once, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            brand: parse_selector(&self.brand)?,
            title: parse_selector(&self.title)?,
            title_hidden: parse_selector(&self.title_hidden)?,
            article_item: parse_selector(&self.article_item)?,
            breadcrumbs: parse_selector(&self.breadcrumbs)?,
            breadcrumb_item: parse_selector(&self.breadcrumb_item)?,
            breadcrumb_link: parse_selector(&self.breadcrumb_link)?,
            description_section: parse_selector(&self.description_section)?,
            description_paragraph: parse_selector(&self.description_paragraph)?,
            sizes: parse_selector(&self.sizes)?,
            size_item: parse_selector(&self.size_item)?,
            size_label: parse_selector(&self.size_label)?,
            size_excluded_classes: self.size_excluded_classes.clone(),
            color: parse_selector(&self.color)?,
            slide: parse_selector(&self.slide)?,
            slide_image: parse_selector(&self.slide_image)?,
            lazy_src_attr: self.lazy_src_attr.clone(),
            src_attr: self.src_attr.clone(),
        })
    }
}

/// Parsed form of [`PageSelectors`], ready to query documents.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub brand: Selector,
    pub title: Selector,
    pub title_hidden: Selector,
    pub article_item: Selector,
    pub breadcrumbs: Selector,
    pub breadcrumb_item: Selector,
    pub breadcrumb_link: Selector,
    pub description_section: Selector,
    pub description_paragraph: Selector,
    pub sizes: Selector,
    pub size_item: Selector,
    pub size_label: Selector,
    pub size_excluded_classes: Vec<String>,
    pub color: Selector,
    pub slide: Selector,
    pub slide_image: Selector,
    pub lazy_src_attr: String,
    pub src_attr: String,
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn brand() -> String {
        "span.description__visuallyHidden____sjk5".into()
    }
    pub fn title() -> String {
        "h1[data-test-id=\"productTitle\"]".into()
    }
    pub fn title_hidden() -> String {
        "span.description__visuallyHidden____sjk5".into()
    }
    pub fn article_item() -> String {
        "li".into()
    }
    pub fn breadcrumbs() -> String {
        "ul.Breadcrumbs__breadcrumbs___dbDQw".into()
    }
    pub fn breadcrumb_item() -> String {
        "li".into()
    }
    pub fn breadcrumb_link() -> String {
        "a".into()
    }
    pub fn description_section() -> String {
        "section[data-test-id=\"productInfoSectionWrapper\"]".into()
    }
    pub fn description_paragraph() -> String {
        "p".into()
    }
    pub fn sizes() -> String {
        "ul[data-test-id=\"productSizeWrapper\"]".into()
    }
    pub fn size_item() -> String {
        "li".into()
    }
    pub fn size_label() -> String {
        "span".into()
    }
    pub fn size_excluded_classes() -> Vec<String> {
        vec![
            "Sizes__sizesMobileTitle___skPu9".into(),
            "Sizes__uppercase___U1DRS".into(),
        ]
    }
    pub fn color() -> String {
        "span.SingleColor__colorTitle___VTGcs".into()
    }
    pub fn slide() -> String {
        "div.Desktop__slide___S6W7J".into()
    }
    pub fn slide_image() -> String {
        "img".into()
    }
    pub fn lazy_src_attr() -> String {
        "data-src".into()
    }
    pub fn src_attr() -> String {
        "src".into()
    }
}
