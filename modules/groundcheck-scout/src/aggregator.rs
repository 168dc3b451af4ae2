use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use groundcheck_common::{
    Claim, EvidenceBundle, EvidenceItem, RhetoricFlag, ScrapedContent, SearchResult,
};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::fetcher::{FetchFailure, PageFetcher};
use crate::rhetoric::RhetoricAnalyzer;

/// What happened to one candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Scraped(ScrapedContent),
    /// Loaded, but nothing readable was extracted.
    Empty,
    Failed(String),
}

impl SourceOutcome {
    fn from_fetch(result: Result<ScrapedContent, FetchFailure>) -> Self {
        match result {
            Ok(content) => SourceOutcome::Scraped(content),
            Err(FetchFailure::Empty) => SourceOutcome::Empty,
            Err(other) => SourceOutcome::Failed(other.to_string()),
        }
    }
}

/// Fans out one fetch per candidate source, plus one rhetoric pass over all
/// titles and snippets, and assembles whatever survives in rank order.
pub struct EvidenceAggregator {
    fetcher: PageFetcher,
    rhetoric: Option<Arc<dyn RhetoricAnalyzer>>,
    rhetoric_grace: Duration,
}

impl EvidenceAggregator {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            rhetoric: None,
            rhetoric_grace: Duration::from_secs(2),
        }
    }

    pub fn with_rhetoric(mut self, analyzer: Arc<dyn RhetoricAnalyzer>, grace: Duration) -> Self {
        self.rhetoric = Some(analyzer);
        self.rhetoric_grace = grace;
        self
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Build the evidence bundle for `claim`. Never fails: sources that do not
    /// load are left out and an empty input yields an empty bundle without
    /// any fetch.
    pub async fn aggregate(&self, claim: &Claim, results: Vec<SearchResult>) -> EvidenceBundle {
        if results.is_empty() {
            info!(claim = claim.as_str(), "No candidate sources, skipping fetch");
            return EvidenceBundle::empty(claim.clone());
        }

        let rhetoric_task = self.rhetoric.clone().map(|analyzer| {
            let results = results.clone();
            tokio::spawn(async move { analyzer.analyze(&results).await })
        });

        let outcomes = self.fetch_all(&results).await;
        let mut flags = match rhetoric_task {
            Some(handle) => self.await_rhetoric(handle).await,
            None => HashMap::new(),
        };

        let total = results.len();
        let items: Vec<EvidenceItem> = results
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .filter_map(|(index, (result, outcome))| match outcome {
                SourceOutcome::Scraped(content) => Some(EvidenceItem {
                    rhetoric: flags.remove(&index),
                    search_result: result,
                    scraped: Some(content),
                }),
                SourceOutcome::Empty => {
                    warn!(
                        url = result.url.as_str(),
                        rank = result.rank,
                        "No readable content, source dropped"
                    );
                    None
                }
                SourceOutcome::Failed(reason) => {
                    warn!(
                        url = result.url.as_str(),
                        rank = result.rank,
                        %reason,
                        "Source dropped"
                    );
                    None
                }
            })
            .collect();

        info!(
            claim = claim.as_str(),
            candidates = total,
            kept = items.len(),
            "Evidence aggregated"
        );
        EvidenceBundle::from_items(claim.clone(), items)
    }

    /// Fetch every source concurrently. Outcomes are indexed like `results`;
    /// a task that dies without reporting counts as failed.
    pub async fn fetch_all(&self, results: &[SearchResult]) -> Vec<SourceOutcome> {
        let mut set = JoinSet::new();
        for (index, result) in results.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let url = result.url.clone();
            set.spawn(async move {
                let outcome = SourceOutcome::from_fetch(fetcher.try_fetch(&url).await);
                (index, outcome)
            });
        }

        let mut outcomes =
            vec![SourceOutcome::Failed("fetch task did not complete".to_string()); results.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = outcome,
                Err(e) => warn!(error = %e, "Fetch task failed"),
            }
        }
        outcomes
    }

    /// Give the rhetoric pass a short grace period once fetches are done,
    /// then abort it. Flags are advisory, so every failure means "no flags".
    async fn await_rhetoric(
        &self,
        mut handle: tokio::task::JoinHandle<anyhow::Result<HashMap<usize, RhetoricFlag>>>,
    ) -> HashMap<usize, RhetoricFlag> {
        match tokio::time::timeout(self.rhetoric_grace, &mut handle).await {
            Ok(Ok(Ok(flags))) => {
                debug!(flagged = flags.len(), "Rhetoric flags attached");
                flags
            }
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Rhetoric analysis failed, continuing without flags");
                HashMap::new()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Rhetoric task failed, continuing without flags");
                HashMap::new()
            }
            Err(_) => {
                handle.abort();
                warn!(
                    grace_ms = self.rhetoric_grace.as_millis() as u64,
                    "Rhetoric analysis not ready, aborted"
                );
                HashMap::new()
            }
        }
    }
}
