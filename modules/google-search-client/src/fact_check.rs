use std::time::Duration;

use crate::error::{Result, SearchError};
use crate::types::{ClaimItem, ClaimSearchResponse};

const FACT_CHECK_URL: &str = "https://factchecktools.googleapis.com";

/// Client for the Fact Check Tools claim search (`/v1alpha1/claims:search`).
pub struct FactCheckClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FactCheckClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: FACT_CHECK_URL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Search published fact-checks for claims matching `query`.
    pub async fn search_claims(
        &self,
        query: &str,
        page_size: u32,
        language_code: &str,
    ) -> Result<Vec<ClaimItem>> {
        let endpoint = format!("{}/v1alpha1/claims:search", self.base_url);
        let page_size = page_size.to_string();

        let resp = self
            .client
            .get(&endpoint)
            .query(&[
                ("query", query),
                ("key", self.api_key.as_str()),
                ("pageSize", page_size.as_str()),
                ("languageCode", language_code),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let data: ClaimSearchResponse = serde_json::from_str(&body)?;

        tracing::debug!(query, count = data.claims.len(), "Fact Check claim search response");
        Ok(data.claims)
    }
}
