use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use groundcheck_common::{truncate_head_tail, ScrapedContent};
use tracing::{debug, warn};

use crate::scraper::PageScraper;

/// Why a page produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Timeout(Duration),
    Error(String),
    /// The page loaded but Readability left nothing behind.
    Empty,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Timeout(d) => write!(f, "timed out after {}s", d.as_secs_f32()),
            FetchFailure::Error(e) => write!(f, "{e}"),
            FetchFailure::Empty => write!(f, "no readable content"),
        }
    }
}

/// Bounded single-page fetch: one deadline, one head+tail cut.
#[derive(Clone)]
pub struct PageFetcher {
    scraper: Arc<dyn PageScraper>,
    timeout: Duration,
    max_chars: usize,
}

impl PageFetcher {
    pub fn new(scraper: Arc<dyn PageScraper>, timeout: Duration, max_chars: usize) -> Self {
        Self {
            scraper,
            timeout,
            max_chars,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Fetch and extract `url`, reporting why nothing came back.
    pub async fn try_fetch(&self, url: &str) -> Result<ScrapedContent, FetchFailure> {
        let text = match tokio::time::timeout(self.timeout, self.scraper.scrape(url)).await {
            Err(_) => return Err(FetchFailure::Timeout(self.timeout)),
            Ok(Err(e)) => return Err(FetchFailure::Error(format!("{e:#}"))),
            Ok(Ok(text)) => text,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(FetchFailure::Empty);
        }

        let cut = truncate_head_tail(text, self.max_chars);
        debug!(
            url,
            scraper = self.scraper.name(),
            chars = cut.text.chars().count(),
            truncated = cut.truncated,
            "Page extracted"
        );
        Ok(ScrapedContent {
            source_url: url.to_string(),
            extracted_text: cut.text,
            truncated: cut.truncated,
        })
    }

    /// Like [`try_fetch`](Self::try_fetch) but every failure collapses to `None`.
    pub async fn fetch(&self, url: &str) -> Option<ScrapedContent> {
        match self.try_fetch(url).await {
            Ok(content) => Some(content),
            Err(reason) => {
                warn!(url, %reason, "Fetch failed, source dropped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockScraper;

    fn fetcher(scraper: MockScraper) -> PageFetcher {
        PageFetcher::new(Arc::new(scraper), Duration::from_secs(10), 4000)
    }

    #[tokio::test]
    async fn short_page_passes_through() {
        let scraper = MockScraper::new().on_page("https://a.com", "Rayleigh scattering.");
        let content = fetcher(scraper).fetch("https://a.com").await.unwrap();
        assert_eq!(content.extracted_text, "Rayleigh scattering.");
        assert_eq!(content.source_url, "https://a.com");
        assert!(!content.truncated);
    }

    #[tokio::test]
    async fn long_page_is_cut_to_the_cap() {
        let scraper = MockScraper::new().on_page("https://a.com", &"word ".repeat(3000));
        let content = fetcher(scraper).fetch("https://a.com").await.unwrap();
        assert_eq!(content.extracted_text.chars().count(), 4000);
        assert!(content.truncated);
    }

    #[tokio::test]
    async fn scraper_error_is_reported() {
        let scraper = MockScraper::new().on_error("https://down.com", "connection refused");
        let err = fetcher(scraper).try_fetch("https://down.com").await.unwrap_err();
        assert!(matches!(err, FetchFailure::Error(ref m) if m.contains("connection refused")));
    }

    #[tokio::test]
    async fn blank_extraction_is_empty() {
        let scraper = MockScraper::new().on_page("https://a.com", "   \n  ");
        let err = fetcher(scraper).try_fetch("https://a.com").await.unwrap_err();
        assert_eq!(err, FetchFailure::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_page_times_out() {
        let scraper = MockScraper::new()
            .on_page("https://slow.com", "eventually")
            .with_delay("https://slow.com", Duration::from_secs(30));
        let err = fetcher(scraper).try_fetch("https://slow.com").await.unwrap_err();
        assert_eq!(err, FetchFailure::Timeout(Duration::from_secs(10)));
    }
}
