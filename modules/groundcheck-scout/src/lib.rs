pub mod aggregator;
pub mod fetcher;
pub mod media;
pub mod oracle;
pub mod pipeline;
pub mod rate_limiter;
mod readability;
pub mod render;
pub mod rhetoric;
pub mod scraper;
pub mod searcher;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use aggregator::{EvidenceAggregator, SourceOutcome};
pub use fetcher::{FetchFailure, PageFetcher};
pub use media::{ManipulationAssessment, MediaAnalyzer};
pub use oracle::{EvidenceSerializer, ModelOracle, OracleRequest, VerdictOracle};
pub use pipeline::{CheckError, FactCheckPipeline, FactCheckReport, Outcome};
pub use rate_limiter::RateLimiter;
pub use rhetoric::{KeywordRhetoricAnalyzer, ModelRhetoricAnalyzer, RhetoricAnalyzer};
pub use scraper::{HttpScraper, PageScraper};
pub use searcher::{
    GoogleFactCheckSearcher, GoogleSearcher, PriorReviewSearcher, SearchHit, SourceRanker,
    WebSearcher,
};
