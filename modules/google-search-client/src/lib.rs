pub mod error;
mod fact_check;
pub mod types;

pub use error::{Result, SearchError};
pub use fact_check::FactCheckClient;
pub use types::{ClaimItem, ClaimReview, Publisher, SearchItem, SearchQuery};

use std::time::Duration;

use types::SearchResponse;

const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com";

/// Client for the Custom Search JSON API (`/customsearch/v1`).
pub struct CustomSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl CustomSearchClient {
    pub fn new(api_key: &str, engine_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: CUSTOM_SEARCH_URL.to_string(),
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Run one ranked search. Items come back in the index's relevance order;
    /// a query with no hits yields an empty vec.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>> {
        let endpoint = format!("{}/customsearch/v1", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("key", self.api_key.clone()),
            ("cx", self.engine_id.clone()),
            ("q", query.q.clone()),
            ("num", query.num.to_string()),
        ];
        if let Some(ref language) = query.language {
            params.push(("hl", language.clone()));
        }

        let resp = self.client.get(&endpoint).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let data: SearchResponse = serde_json::from_str(&body)?;

        tracing::debug!(q = query.q.as_str(), count = data.items.len(), "Custom Search response");
        Ok(data.items)
    }
}
