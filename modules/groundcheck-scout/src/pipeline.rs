use std::sync::Arc;
use std::time::Duration;

use ai_client::{Gemini, TextModel};
use google_search_client::{CustomSearchClient, FactCheckClient};
use groundcheck_common::{
    Claim, Config, EvidenceBundle, GroundcheckError, PriorReview, RhetoricMode, Verdict,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::EvidenceAggregator;
use crate::fetcher::PageFetcher;
use crate::media::MediaAnalyzer;
use crate::oracle::{
    serialize_prior_reviews, EvidenceSerializer, ModelOracle, OracleRequest, VerdictOracle,
};
use crate::rate_limiter::RateLimiter;
use crate::render::{render_prior_reviews, render_verdict, ORACLE_FALLBACK};
use crate::rhetoric::{KeywordRhetoricAnalyzer, ModelRhetoricAnalyzer};
use crate::scraper::HttpScraper;
use crate::searcher::{
    GoogleFactCheckSearcher, GoogleSearcher, PriorReviewSearcher, SourceRanker,
};

/// Characters of page text used as the claim when checking a link.
const URL_CLAIM_CHARS: usize = 1000;

/// Extra transport allowance on top of the fetch deadline.
const SCRAPER_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Reasons a check cannot start. Everything after the claim is accepted
/// degrades instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("claim is empty")]
    EmptyClaim,

    #[error("could not read any content from {0}")]
    UnreadableUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "verdict", rename_all = "snake_case")]
pub enum Outcome {
    Judged(Verdict),
    /// The oracle errored or answered without a recognisable verdict.
    OracleUnavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactCheckReport {
    pub claim: Claim,
    /// Set when the claim was read from a link.
    pub source_url: Option<String>,
    pub bundle: EvidenceBundle,
    pub prior_reviews: Vec<PriorReview>,
    pub outcome: Outcome,
    /// Chat-ready text.
    pub rendered: String,
}

/// Claim in, report out: search, fetch, judge, render.
pub struct FactCheckPipeline {
    ranker: SourceRanker,
    aggregator: EvidenceAggregator,
    oracle: Arc<dyn VerdictOracle>,
    serializer: EvidenceSerializer,
    prior_reviews: Option<Arc<dyn PriorReviewSearcher>>,
    media: Option<MediaAnalyzer>,
}

impl FactCheckPipeline {
    pub fn new(
        ranker: SourceRanker,
        aggregator: EvidenceAggregator,
        oracle: Arc<dyn VerdictOracle>,
        serializer: EvidenceSerializer,
    ) -> Self {
        Self {
            ranker,
            aggregator,
            oracle,
            serializer,
            prior_reviews: None,
            media: None,
        }
    }

    pub fn with_prior_reviews(mut self, searcher: Arc<dyn PriorReviewSearcher>) -> Self {
        self.prior_reviews = Some(searcher);
        self
    }

    pub fn with_media(mut self, media: MediaAnalyzer) -> Self {
        self.media = Some(media);
        self
    }

    pub fn media(&self) -> Option<&MediaAnalyzer> {
        self.media.as_ref()
    }

    /// Wire production collaborators from config. Both limiters are created
    /// here and shared by every component that calls the same upstream.
    pub fn from_config(config: &Config) -> Result<Self, GroundcheckError> {
        let search_limiter = Arc::new(RateLimiter::new(
            "search",
            config.search_rate_limit,
            config.rate_limit_window,
        )?);
        let oracle_limiter = Arc::new(RateLimiter::new(
            "oracle",
            config.oracle_rate_limit,
            config.rate_limit_window,
        )?);

        let searcher = GoogleSearcher::new(
            CustomSearchClient::new(&config.google_api_key, &config.google_cse_id),
            &config.search_language,
        );
        let ranker = SourceRanker::new(
            Arc::new(searcher),
            search_limiter.clone(),
            config.search_result_count,
        );

        let scraper = HttpScraper::new(config.fetch_timeout + SCRAPER_TIMEOUT_SLACK)
            .map_err(|e| GroundcheckError::Config(format!("{e:#}")))?;
        let fetcher = PageFetcher::new(
            Arc::new(scraper),
            config.fetch_timeout,
            config.max_content_chars,
        );

        let text_model: Arc<dyn TextModel> = Arc::new(Gemini::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        ));

        let aggregator = EvidenceAggregator::new(fetcher);
        let aggregator = match config.rhetoric_mode {
            RhetoricMode::Model => aggregator.with_rhetoric(
                Arc::new(ModelRhetoricAnalyzer::new(text_model.clone(), oracle_limiter.clone())),
                config.rhetoric_grace,
            ),
            RhetoricMode::Keywords => {
                aggregator.with_rhetoric(Arc::new(KeywordRhetoricAnalyzer), config.rhetoric_grace)
            }
            RhetoricMode::Off => aggregator,
        };

        let oracle = Arc::new(ModelOracle::new(text_model, oracle_limiter.clone()));

        let vision: Arc<dyn TextModel> = Arc::new(Gemini::new(
            config.gemini_api_key.clone(),
            config.gemini_vision_model.clone(),
        ));
        let media = MediaAnalyzer::new(vision, oracle_limiter);

        let mut pipeline = Self::new(
            ranker,
            aggregator,
            oracle,
            EvidenceSerializer::new(config.max_evidence_chars),
        )
        .with_media(media);

        if let Some(key) = &config.fact_check_api_key {
            pipeline = pipeline.with_prior_reviews(Arc::new(GoogleFactCheckSearcher::new(
                FactCheckClient::new(key),
                search_limiter,
                &config.search_language,
            )));
        }

        info!(
            model = config.gemini_model.as_str(),
            rhetoric = ?config.rhetoric_mode,
            prior_reviews = config.fact_check_api_key.is_some(),
            "Fact-check pipeline ready"
        );
        Ok(pipeline)
    }

    /// Check free text. A bare link is read first and checked by content.
    pub async fn check(&self, input: &str) -> Result<FactCheckReport, CheckError> {
        let claim = Claim::new(input);
        if claim.is_empty() {
            return Err(CheckError::EmptyClaim);
        }
        if claim.is_url() {
            return self.check_url(claim.as_str()).await;
        }
        Ok(self.run(claim, None).await)
    }

    /// Check the content behind `url`; its opening text becomes the claim.
    pub async fn check_url(&self, url: &str) -> Result<FactCheckReport, CheckError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CheckError::EmptyClaim);
        }

        let content = self
            .aggregator
            .fetcher()
            .fetch(url)
            .await
            .ok_or_else(|| CheckError::UnreadableUrl(url.to_string()))?;

        let claim = Claim::new(
            content
                .extracted_text
                .chars()
                .take(URL_CLAIM_CHARS)
                .collect::<String>(),
        );
        if claim.is_empty() {
            return Err(CheckError::UnreadableUrl(url.to_string()));
        }

        info!(url, chars = claim.as_str().len(), "Checking link content");
        Ok(self.run(claim, Some(url.to_string())).await)
    }

    async fn run(&self, claim: Claim, source_url: Option<String>) -> FactCheckReport {
        info!(claim = claim.as_str(), "Fact check started");

        let (results, prior_reviews) =
            tokio::join!(self.ranker.rank(&claim), self.search_prior_reviews(&claim));

        let bundle = self.aggregator.aggregate(&claim, results).await;
        let request = OracleRequest::new(
            claim.clone(),
            self.serializer.serialize(&bundle),
            serialize_prior_reviews(&prior_reviews),
        );

        let outcome = match self.oracle.judge(&request).await {
            Ok(answer) => match Verdict::parse(&answer) {
                Some(verdict) => Outcome::Judged(verdict),
                None => {
                    let answer = ai_client::preview(&answer, 200);
                    warn!(answer = answer.as_str(), "Oracle answer has no verdict label");
                    Outcome::OracleUnavailable
                }
            },
            Err(e) => {
                let error = format!("{e:#}");
                warn!(error = error.as_str(), "Oracle call failed");
                Outcome::OracleUnavailable
            }
        };

        let rendered = render(&outcome, &prior_reviews);
        info!(
            claim = claim.as_str(),
            sources = bundle.len(),
            prior_reviews = prior_reviews.len(),
            judged = matches!(outcome, Outcome::Judged(_)),
            "Fact check complete"
        );

        FactCheckReport {
            claim,
            source_url,
            bundle,
            prior_reviews,
            outcome,
            rendered,
        }
    }

    async fn search_prior_reviews(&self, claim: &Claim) -> Vec<PriorReview> {
        let Some(searcher) = &self.prior_reviews else {
            return Vec::new();
        };
        match searcher.search(claim).await {
            Ok(reviews) => reviews,
            Err(e) => {
                let error = format!("{e:#}");
                warn!(error = error.as_str(), "Prior fact-check lookup failed");
                Vec::new()
            }
        }
    }
}

fn render(outcome: &Outcome, prior_reviews: &[PriorReview]) -> String {
    match outcome {
        Outcome::Judged(verdict) => {
            let mut text = render_verdict(verdict);
            if let Some(reviews) = render_prior_reviews(prior_reviews) {
                text.push_str("\n\n");
                text.push_str(&reviews);
            }
            text
        }
        Outcome::OracleUnavailable => ORACLE_FALLBACK.to_string(),
    }
}
