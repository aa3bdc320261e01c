// src/services/catalog.rs

//! Remote catalog lookup.
//!
//! Collects the identifiers that were already ingested so they are not
//! scraped again.

use std::collections::HashSet;

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::CatalogConfig;

/// Field carrying the catalog identifier in each item object.
const EXTERNAL_ID_FIELD: &str = "external_item_id";

/// Client for the paginated company-items endpoint.
pub struct CatalogDeduper<'a> {
    client: &'a Client,
    config: &'a CatalogConfig,
}

impl<'a> CatalogDeduper<'a> {
    pub fn new(client: &'a Client, config: &'a CatalogConfig) -> Self {
        Self { client, config }
    }

    /// Fetch every known identifier, page by page, until an empty page.
    ///
    /// Any failure is fatal: a partial set would let known items through.
    pub async fn fetch_known_ids(&self) -> Result<HashSet<String>> {
        let mut known = HashSet::new();

        for page in 1..=self.config.max_pages {
            let items = self.fetch_page(page).await?;
            if items.is_empty() {
                log::info!("Found {} external ids in catalog", known.len());
                return Ok(known);
            }

            let before = known.len();
            known.extend(items.iter().filter_map(external_id));
            log::debug!(
                "Catalog page {}: {} items, {} new ids",
                page,
                items.len(),
                known.len() - before
            );
        }

        Err(AppError::catalog(format!(
            "pagination did not end within {} pages",
            self.config.max_pages
        )))
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(&self.config.api_url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("company_id", self.config.company_id.clone()),
                ("limit", self.config.limit.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::catalog(format!("page {page}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::catalog(format!(
                "page {page} answered with status {status}"
            )));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| AppError::catalog(format!("page {page} is not a JSON array: {e}")))
    }
}

fn external_id(item: &Value) -> Option<String> {
    match item.get(EXTERNAL_ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_config(server: &MockServer) -> CatalogConfig {
        CatalogConfig {
            api_url: format!("{}/api/get_company_items", server.uri()),
            company_id: "shop".to_string(),
            limit: 2,
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn test_external_id_variants() {
        assert_eq!(external_id(&json!({"external_item_id": "A1"})), Some("A1".into()));
        assert_eq!(external_id(&json!({"external_item_id": 77})), Some("77".into()));
        assert_eq!(external_id(&json!({"other": "x"})), None);
        assert_eq!(external_id(&json!({"external_item_id": null})), None);
    }

    #[tokio::test]
    async fn test_paginates_until_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_company_items"))
            .and(query_param("company_id", "shop"))
            .and(query_param("limit", "2"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"external_item_id": "1"},
                {"external_item_id": "2"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"external_item_id": "3"},
                {"name": "no id here"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let config = catalog_config(&server);
        let known = CatalogDeduper::new(&client, &config)
            .fetch_known_ids()
            .await
            .unwrap();

        let mut ids: Vec<_> = known.into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3"]);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_error_status_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = Client::new();
        let config = catalog_config(&server);
        let result = CatalogDeduper::new(&client, &config).fetch_known_ids().await;
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_page_cap_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"external_item_id": "1"}])),
            )
            .mount(&server)
            .await;

        let client = Client::new();
        let config = CatalogConfig {
            max_pages: 3,
            ..catalog_config(&server)
        };
        let result = CatalogDeduper::new(&client, &config).fetch_known_ids().await;
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }
}
