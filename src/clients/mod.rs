/// External API clients module
use crate::domain::StarSystem;
use crate::errors::{ApiError, ApiResult};
use crate::repo::parse_catalog_document;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout_seconds: u64) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("exo-explorer/1.0")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Fetches the static catalog document from a remote host
pub struct CatalogClient {
    http_client: HttpClient,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: String, timeout_seconds: u64) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout_seconds)?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and decode the whole catalog in one request
    pub async fn fetch_systems(&self) -> ApiResult<Vec<StarSystem>> {
        let resp = self
            .http_client
            .get_client()
            .get(&self.base_url)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Catalog(format!(
                "catalog request failed with status {}",
                resp.status()
            )));
        }

        let json: Value = resp.json().await?;
        parse_catalog_document(json)
    }
}
