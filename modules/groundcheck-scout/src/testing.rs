// Test doubles for the evidence pipeline.
//
// One mock per trait seam:
// - MockSearcher (WebSearcher): query → hits, or a fixed failure
// - MockScraper (PageScraper): URL → text / error, optional per-URL delay
// - MockTextModel (TextModel): canned reply, records prompts
// - MockOracle (VerdictOracle): canned answer, records requests
// - MockRhetoric (RhetoricAnalyzer): fixed flags, optional delay
// - MockPriorReviews (PriorReviewSearcher): fixed reviews

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ai_client::TextModel;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use groundcheck_common::{Claim, PriorReview, RhetoricFlag, SearchResult};

use crate::oracle::{OracleRequest, VerdictOracle};
use crate::rhetoric::RhetoricAnalyzer;
use crate::scraper::PageScraper;
use crate::searcher::{PriorReviewSearcher, SearchHit, WebSearcher};

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Unregistered queries return no hits.
pub struct MockSearcher {
    results: HashMap<String, Vec<SearchHit>>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn on_search(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), hits);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        Ok(self
            .results
            .get(query)
            .map(|hits| hits.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}

/// Hit builder for tests.
pub fn hit(url: &str, title: &str, snippet: &str) -> SearchHit {
    SearchHit {
        url: url.to_string(),
        title: title.to_string(),
        snippet: snippet.to_string(),
    }
}

/// Ranked result builder for tests.
pub fn ranked(rank: usize, url: &str) -> SearchResult {
    SearchResult {
        title: format!("Source {rank}"),
        url: url.to_string(),
        snippet: format!("snippet {rank}"),
        rank,
    }
}

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

/// URL-keyed scraper. Unregistered URLs fail like an unreachable host.
pub struct MockScraper {
    pages: HashMap<String, Result<String, String>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockScraper {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn on_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(text.to_string()));
        self
    }

    pub fn on_error(mut self, url: &str, message: &str) -> Self {
        self.pages.insert(url.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Number of `scrape` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        match self.pages.get(url) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(anyhow!("{message}")),
            None => bail!("connection refused: {url}"),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockTextModel
// ---------------------------------------------------------------------------

pub struct MockTextModel {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
    images: Mutex<Vec<(usize, String)>>,
}

impl MockTextModel {
    pub fn new() -> Self {
        Self {
            reply: Ok(String::new()),
            prompts: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Ok(reply.to_string());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.reply = Err(message.to_string());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// `(byte count, mime type)` of every image seen.
    pub fn images(&self) -> Vec<(usize, String)> {
        self.images.lock().unwrap().clone()
    }

    fn answer(&self) -> Result<String> {
        self.reply.clone().map_err(|m| anyhow!("{m}"))
    }
}

impl Default for MockTextModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextModel for MockTextModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer()
    }

    async fn describe_image(&self, bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.images
            .lock()
            .unwrap()
            .push((bytes.len(), mime_type.to_string()));
        self.answer()
    }

    fn name(&self) -> &str {
        "mock-model"
    }
}

// ---------------------------------------------------------------------------
// MockOracle
// ---------------------------------------------------------------------------

pub struct MockOracle {
    answer: Result<String, String>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl MockOracle {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerdictOracle for MockOracle {
    async fn judge(&self, request: &OracleRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.clone().map_err(|m| anyhow!("{m}"))
    }
}

// ---------------------------------------------------------------------------
// MockRhetoric
// ---------------------------------------------------------------------------

pub struct MockRhetoric {
    flags: HashMap<usize, RhetoricFlag>,
    delay: Option<Duration>,
    fail: bool,
}

impl MockRhetoric {
    pub fn new() -> Self {
        Self {
            flags: HashMap::new(),
            delay: None,
            fail: false,
        }
    }

    pub fn flag(mut self, index: usize, flag: RhetoricFlag) -> Self {
        self.flags.insert(index, flag);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Default for MockRhetoric {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RhetoricAnalyzer for MockRhetoric {
    async fn analyze(&self, _results: &[SearchResult]) -> Result<HashMap<usize, RhetoricFlag>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            bail!("rhetoric model unavailable");
        }
        Ok(self.flags.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockPriorReviews
// ---------------------------------------------------------------------------

pub struct MockPriorReviews {
    reviews: Result<Vec<PriorReview>, String>,
}

impl MockPriorReviews {
    pub fn with(reviews: Vec<PriorReview>) -> Self {
        Self {
            reviews: Ok(reviews),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reviews: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl PriorReviewSearcher for MockPriorReviews {
    async fn search(&self, _claim: &Claim) -> Result<Vec<PriorReview>> {
        self.reviews.clone().map_err(|m| anyhow!("{m}"))
    }
}

/// Review builder for tests.
pub fn review(publisher: &str, rating: &str, url: &str) -> PriorReview {
    PriorReview {
        claim_text: "claim under review".to_string(),
        claimant: None,
        publisher: Some(publisher.to_string()),
        url: url.to_string(),
        rating: Some(rating.to_string()),
        review_date: None,
    }
}
