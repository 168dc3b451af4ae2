use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_search_client::{CustomSearchClient, FactCheckClient, SearchQuery};
use groundcheck_common::{Claim, PriorReview, SearchResult};
use tracing::{info, warn};

use crate::rate_limiter::RateLimiter;

// --- WebSearcher trait ---

/// One raw hit from a search backend, before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Hits in the backend's relevance order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

// --- Google Custom Search ---

pub struct GoogleSearcher {
    client: CustomSearchClient,
    language: String,
}

impl GoogleSearcher {
    pub fn new(client: CustomSearchClient, language: &str) -> Self {
        Self {
            client,
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl WebSearcher for GoogleSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        info!(query, max_results, "Custom Search");

        let request = SearchQuery::new(query, max_results).language(&self.language);
        let items = self
            .client
            .search(&request)
            .await
            .context("Custom Search request failed")?;

        let hits: Vec<SearchHit> = items
            .into_iter()
            .map(|item| SearchHit {
                url: item.link,
                title: item.title,
                snippet: item.snippet,
            })
            .collect();

        info!(query, count = hits.len(), "Custom Search complete");
        Ok(hits)
    }
}

// --- SourceRanker ---

/// Turns a claim into ranked candidate sources. Never fails: transport
/// errors and empty indexes both yield an empty list.
pub struct SourceRanker {
    searcher: Arc<dyn WebSearcher>,
    limiter: Arc<RateLimiter>,
    result_count: usize,
}

impl SourceRanker {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        limiter: Arc<RateLimiter>,
        result_count: usize,
    ) -> Self {
        Self {
            searcher,
            limiter,
            result_count: result_count.clamp(1, 10),
        }
    }

    pub async fn rank(&self, claim: &Claim) -> Vec<SearchResult> {
        self.limiter.acquire().await;

        let hits = match self.searcher.search(claim.as_str(), self.result_count).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(claim = claim.as_str(), error = %e, "Search failed, no candidate sources");
                return Vec::new();
            }
        };

        let results = rank_hits(hits, self.result_count);
        if results.is_empty() {
            info!(claim = claim.as_str(), "Search returned no results");
        }
        results
    }
}

/// Keep index order, drop hits without a URL, number the rest from 1.
fn rank_hits(hits: Vec<SearchHit>, limit: usize) -> Vec<SearchResult> {
    hits.into_iter()
        .filter(|hit| !hit.url.trim().is_empty())
        .take(limit)
        .enumerate()
        .map(|(i, hit)| SearchResult {
            title: hit.title,
            url: hit.url.trim().to_string(),
            snippet: hit.snippet,
            rank: i + 1,
        })
        .collect()
}

// --- Prior fact-checks ---

#[async_trait]
pub trait PriorReviewSearcher: Send + Sync {
    async fn search(&self, claim: &Claim) -> Result<Vec<PriorReview>>;
}

/// Fact Check Tools `claims:search`, flattened to one entry per review.
pub struct GoogleFactCheckSearcher {
    client: FactCheckClient,
    limiter: Arc<RateLimiter>,
    language: String,
    page_size: u32,
}

impl GoogleFactCheckSearcher {
    pub fn new(client: FactCheckClient, limiter: Arc<RateLimiter>, language: &str) -> Self {
        Self {
            client,
            limiter,
            language: language.to_string(),
            page_size: 5,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl PriorReviewSearcher for GoogleFactCheckSearcher {
    async fn search(&self, claim: &Claim) -> Result<Vec<PriorReview>> {
        self.limiter.acquire().await;

        let claims = self
            .client
            .search_claims(claim.as_str(), self.page_size, &self.language)
            .await
            .context("Fact Check Tools request failed")?;

        let reviews: Vec<PriorReview> = claims
            .into_iter()
            .flat_map(|item| {
                let claim_text = item.text;
                let claimant = item.claimant;
                item.claim_review.into_iter().map(move |review| PriorReview {
                    claim_text: claim_text.clone(),
                    claimant: claimant.clone(),
                    publisher: review.publisher.and_then(|p| p.name.or(p.site)),
                    url: review.url,
                    rating: review.textual_rating,
                    review_date: review.review_date,
                })
            })
            .filter(|review| !review.url.is_empty())
            .collect();

        info!(claim = claim.as_str(), count = reviews.len(), "Prior fact-checks found");
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::MockSearcher;

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: format!("title for {url}"),
            snippet: String::new(),
        }
    }

    fn limiter() -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new("search", 50, Duration::from_secs(60)).unwrap())
    }

    #[test]
    fn ranks_follow_index_order_and_skip_missing_urls() {
        let hits = vec![hit("https://a.com"), hit(""), hit("https://b.com"), hit("  ")];
        let ranked = rank_hits(hits, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].url, "https://a.com");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].url, "https://b.com");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn ranking_caps_at_the_limit() {
        let hits = (0..8).map(|i| hit(&format!("https://{i}.com"))).collect();
        assert_eq!(rank_hits(hits, 5).len(), 5);
    }

    #[tokio::test]
    async fn search_failure_yields_no_sources() {
        let ranker = SourceRanker::new(Arc::new(MockSearcher::failing("quota exceeded")), limiter(), 5);
        assert!(ranker.rank(&Claim::new("the sky is green")).await.is_empty());
    }

    #[tokio::test]
    async fn ranker_passes_the_claim_as_query() {
        let searcher = Arc::new(MockSearcher::new().on_search(
            "the sky is blue",
            vec![hit("https://nasa.gov/sky"), hit("https://noaa.gov/sky")],
        ));
        let ranker = SourceRanker::new(searcher.clone(), limiter(), 5);
        let results = ranker.rank(&Claim::new("the sky is blue")).await;
        assert_eq!(results.len(), 2);
        assert_eq!(searcher.queries(), vec!["the sky is blue".to_string()]);
    }
}
