// src/services/fetcher.rs

//! Product page retrieval.

use encoding_rs::Encoding;
use reqwest::Client;

use crate::error::Result;
use crate::utils::{encoding, http};

/// Downloads product pages and decodes them to text.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    fallback: &'static Encoding,
}

impl PageFetcher {
    pub fn new(client: Client, fallback_encoding: &str) -> Self {
        Self {
            client,
            fallback: encoding::encoding_for_label(fallback_encoding),
        }
    }

    /// Fetch one page; non-success status and transport errors are returned.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let bytes = http::fetch_bytes(&self.client, url).await?;
        Ok(encoding::decode_html(&bytes, self.fallback))
    }
}
