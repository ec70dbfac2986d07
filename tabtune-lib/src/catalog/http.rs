//! Blocking HTTP client for the catalog endpoint.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value;

use super::{Catalog, CatalogError, SearchResponse, SearchResult, VideoInfo};
use crate::settings::CatalogSettings;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    api_base: String,
}

impl HttpCatalog {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        debug!("catalog GET {}", url);
        let response = self.client.get(url).send()?;
        let status = response.status();
        let body: Value = response.json()?;
        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(CatalogError::Status {
                code: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

impl Catalog for HttpCatalog {
    fn video(&self, media_id: &str) -> Result<VideoInfo, CatalogError> {
        let url = format!(
            "{}/api/video?id={}",
            self.api_base,
            urlencoding::encode(media_id)
        );
        Ok(serde_json::from_value(self.get_json(&url)?)?)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        let url = format!(
            "{}/api/search?q={}",
            self.api_base,
            urlencoding::encode(query)
        );
        let response: SearchResponse = serde_json::from_value(self.get_json(&url)?)?;
        Ok(response.results)
    }
}
