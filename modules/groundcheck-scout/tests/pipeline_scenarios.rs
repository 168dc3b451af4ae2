//! End-to-end pipeline scenarios with every external service mocked.

use std::sync::Arc;
use std::time::Duration;

use groundcheck_common::{EvidenceStatus, VerdictLabel};
use groundcheck_scout::oracle::NO_SOURCES;
use groundcheck_scout::render::ORACLE_FALLBACK;
use groundcheck_scout::testing::{
    hit, review, MockOracle, MockPriorReviews, MockScraper, MockSearcher,
};
use groundcheck_scout::{
    CheckError, EvidenceAggregator, EvidenceSerializer, FactCheckPipeline, Outcome, PageFetcher,
    RateLimiter, SourceRanker,
};

const FALSE_ANSWER: &str = "VERDICT: FALSE\n\nEVIDENCE:\n- sources describe a blue sky\n\n\
SOURCE SUMMARY:\nAll sources agree.\n\nRHETORIC ASSESSMENT: None.\n\nCONCLUSION:\nThe claim is false.";

struct Harness {
    pipeline: FactCheckPipeline,
    scraper: Arc<MockScraper>,
    oracle: Arc<MockOracle>,
}

fn harness(searcher: MockSearcher, scraper: MockScraper, oracle: MockOracle) -> Harness {
    let limiter = Arc::new(RateLimiter::new("search", 50, Duration::from_secs(60)).unwrap());
    let scraper = Arc::new(scraper);
    let oracle = Arc::new(oracle);

    let ranker = SourceRanker::new(Arc::new(searcher), limiter, 5);
    let fetcher = PageFetcher::new(scraper.clone(), Duration::from_secs(10), 4000);
    let pipeline = FactCheckPipeline::new(
        ranker,
        EvidenceAggregator::new(fetcher),
        oracle.clone(),
        EvidenceSerializer::new(24_000),
    );

    Harness {
        pipeline,
        scraper,
        oracle,
    }
}

fn five_sources(claim: &str) -> MockSearcher {
    MockSearcher::new().on_search(
        claim,
        (1..=5)
            .map(|i| hit(&format!("https://site{i}.org/a"), &format!("Story {i}"), "snippet"))
            .collect(),
    )
}

#[tokio::test]
async fn zero_results_take_the_no_evidence_path() {
    let h = harness(
        MockSearcher::new(),
        MockScraper::new(),
        MockOracle::answering("VERDICT: UNVERIFIABLE\nCONCLUSION:\nNothing found."),
    );

    let report = h.pipeline.check("the sky is green").await.unwrap();

    assert!(report.bundle.is_empty());
    assert_eq!(report.bundle.status, EvidenceStatus::NoEvidence);
    assert_eq!(h.scraper.calls(), 0);

    let requests = h.oracle.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].evidence, NO_SOURCES);
    assert!(matches!(report.outcome, Outcome::Judged(ref v) if v.label == VerdictLabel::Unverifiable));
}

#[tokio::test]
async fn unreachable_sources_are_dropped_in_rank_order() {
    let scraper = MockScraper::new()
        .on_page("https://site1.org/a", "one")
        .on_page("https://site2.org/a", "two")
        .on_page("https://site3.org/a", "three");
    // site4 and site5 are not registered and fail like unreachable hosts
    let h = harness(five_sources("the sky is blue"), scraper, MockOracle::answering(FALSE_ANSWER));

    let report = h.pipeline.check("the sky is blue").await.unwrap();

    assert_eq!(report.bundle.ranks(), vec![1, 2, 3]);
    assert_eq!(report.bundle.status, EvidenceStatus::Found);
    assert_eq!(h.scraper.calls(), 5);

    let evidence = &h.oracle.requests()[0].evidence;
    assert!(evidence.contains("=== Source 1: [site1.org] Story 1 ==="));
    assert!(!evidence.contains("Source 4"));
    assert!(report.rendered.contains("❌ VERDICT: FALSE"));
}

/// Which ranks go down first as the failure count grows.
const FAIL_ORDER: [usize; 5] = [1, 3, 5, 2, 4];

#[tokio::test]
async fn any_k_failures_leave_n_minus_k_sources() {
    for failing in 0..=5usize {
        let mut scraper = MockScraper::new();
        for i in 1..=5 {
            let url = format!("https://site{i}.org/a");
            scraper = if FAIL_ORDER[..failing].contains(&i) {
                scraper.on_error(&url, "503 Service Unavailable")
            } else {
                scraper.on_page(&url, "content")
            };
        }

        let h = harness(five_sources("claim"), scraper, MockOracle::answering(FALSE_ANSWER));
        let report = h.pipeline.check("claim").await.unwrap();

        let ranks = report.bundle.ranks();
        assert_eq!(ranks.len(), 5 - failing, "with {failing} failures");
        assert!(ranks.windows(2).all(|w| w[0] < w[1]), "ranks out of order: {ranks:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn a_hanging_source_is_bounded_by_the_fetch_timeout() {
    let scraper = MockScraper::new()
        .on_page("https://site1.org/a", "one")
        .on_page("https://site2.org/a", "two")
        .with_delay("https://site2.org/a", Duration::from_secs(600))
        .on_page("https://site3.org/a", "three")
        .on_page("https://site4.org/a", "four")
        .on_page("https://site5.org/a", "five");
    let h = harness(five_sources("claim"), scraper, MockOracle::answering(FALSE_ANSWER));

    let started = tokio::time::Instant::now();
    let report = h.pipeline.check("claim").await.unwrap();

    assert_eq!(report.bundle.ranks(), vec![1, 3, 4, 5]);
    assert!(started.elapsed() < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn slow_sources_are_fetched_concurrently() {
    let mut scraper = MockScraper::new();
    for i in 1..=5 {
        let url = format!("https://site{i}.org/a");
        scraper = scraper
            .on_page(&url, "content")
            .with_delay(&url, Duration::from_secs(5));
    }
    let h = harness(five_sources("claim"), scraper, MockOracle::answering(FALSE_ANSWER));

    let started = tokio::time::Instant::now();
    let report = h.pipeline.check("claim").await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.bundle.ranks(), vec![1, 2, 3, 4, 5]);
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(10), "fetches ran serially: {elapsed:?}");
}

#[tokio::test]
async fn malformed_oracle_answer_renders_the_fallback() {
    let h = harness(
        five_sources("claim"),
        MockScraper::new().on_page("https://site1.org/a", "one"),
        MockOracle::answering("I'm sorry, I can't help with that."),
    );

    let report = h.pipeline.check("claim").await.unwrap();
    assert_eq!(report.outcome, Outcome::OracleUnavailable);
    assert_eq!(report.rendered, ORACLE_FALLBACK);
}

#[tokio::test]
async fn oracle_error_renders_the_fallback() {
    let h = harness(five_sources("claim"), MockScraper::new(), MockOracle::failing("500 from upstream"));
    let report = h.pipeline.check("claim").await.unwrap();
    assert_eq!(report.rendered, ORACLE_FALLBACK);
}

#[tokio::test]
async fn empty_claim_is_rejected() {
    let h = harness(MockSearcher::new(), MockScraper::new(), MockOracle::answering(FALSE_ANSWER));
    assert!(matches!(h.pipeline.check("   ").await, Err(CheckError::EmptyClaim)));
    assert!(h.oracle.requests().is_empty());
}

#[tokio::test]
async fn links_are_checked_by_their_content() {
    let article = format!("Scientists say the moon is made of cheese. {}", "More text. ".repeat(200));
    let claim_prefix: String = article.chars().take(1000).collect();
    let searcher = MockSearcher::new().on_search(claim_prefix.trim(), Vec::new());
    let scraper = MockScraper::new().on_page("https://news.example/moon", &article);
    let h = harness(searcher, scraper, MockOracle::answering(FALSE_ANSWER));

    let report = h.pipeline.check("https://news.example/moon").await.unwrap();

    assert_eq!(report.source_url.as_deref(), Some("https://news.example/moon"));
    assert!(report.claim.as_str().starts_with("Scientists say the moon"));
    assert!(report.claim.as_str().chars().count() <= 1000);
}

#[tokio::test]
async fn unreadable_link_is_an_error() {
    let h = harness(MockSearcher::new(), MockScraper::new(), MockOracle::answering(FALSE_ANSWER));
    let err = h.pipeline.check_url("https://gone.example/").await.unwrap_err();
    assert!(matches!(err, CheckError::UnreadableUrl(ref u) if u == "https://gone.example/"));
}

#[tokio::test]
async fn prior_reviews_reach_the_oracle_and_the_reply() {
    let h = harness(MockSearcher::new(), MockScraper::new(), MockOracle::answering(FALSE_ANSWER));
    let pipeline = h.pipeline.with_prior_reviews(Arc::new(MockPriorReviews::with(vec![review(
        "PolitiFact",
        "Pants on Fire",
        "https://politifact.com/x",
    )])));

    let report = pipeline.check("vaccines contain microchips").await.unwrap();

    assert_eq!(report.prior_reviews.len(), 1);
    let request = &h.oracle.requests()[0];
    assert!(request.prior_reviews.as_deref().unwrap().contains("PolitiFact"));
    assert!(report.rendered.contains("🔎 Published fact-checks:\n- PolitiFact: Pants on Fire"));
}

#[tokio::test]
async fn failing_prior_review_lookup_is_ignored() {
    let h = harness(MockSearcher::new(), MockScraper::new(), MockOracle::answering(FALSE_ANSWER));
    let pipeline = h
        .pipeline
        .with_prior_reviews(Arc::new(MockPriorReviews::failing("403 quota")));

    let report = pipeline.check("claim").await.unwrap();
    assert!(report.prior_reviews.is_empty());
    assert!(h.oracle.requests()[0].prior_reviews.is_none());
}

#[tokio::test]
async fn report_serializes_to_json() {
    let h = harness(MockSearcher::new(), MockScraper::new(), MockOracle::answering(FALSE_ANSWER));
    let report = h.pipeline.check("claim").await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["claim"], "claim");
    assert_eq!(json["outcome"]["status"], "judged");
    assert_eq!(json["outcome"]["verdict"]["label"], "FALSE");
    assert_eq!(json["bundle"]["status"], "no_evidence");
}
