use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- Custom Search ---

/// Parameters for one Custom Search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub q: String,
    /// 1..=10; the API rejects anything else.
    pub num: u8,
    /// Interface language, e.g. "en".
    pub language: Option<String>,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>, num: usize) -> Self {
        Self {
            q: q.into(),
            num: num.clamp(1, 10) as u8,
            language: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResponse {
    /// Absent when the query has no results.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// A single organic result, in the index's relevance order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub display_link: Option<String>,
}

// --- Fact Check Tools ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaimSearchResponse {
    #[serde(default)]
    pub claims: Vec<ClaimItem>,
}

/// A claim someone made, with the reviews fact-checkers published about it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub claimant: Option<String>,
    #[serde(default)]
    pub claim_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub review_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub textual_rating: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
}
