use std::sync::Arc;

use ai_client::TextModel;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use groundcheck_common::{Claim, EvidenceBundle, EvidenceItem, PriorReview};
use serde::Serialize;
use tracing::info;

use crate::rate_limiter::RateLimiter;

/// Everything the oracle sees for one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleRequest {
    pub claim: Claim,
    /// Serialized evidence blocks, see [`EvidenceSerializer`].
    pub evidence: String,
    pub prior_reviews: Option<String>,
    pub today: NaiveDate,
}

impl OracleRequest {
    pub fn new(claim: Claim, evidence: String, prior_reviews: Option<String>) -> Self {
        Self {
            claim,
            evidence,
            prior_reviews,
            today: Utc::now().date_naive(),
        }
    }

    /// Full prompt text: date, claim, evidence, prior reviews, instructions.
    pub fn prompt(&self) -> String {
        let today = self.today.format("%B %d, %Y").to_string();
        let prior = match &self.prior_reviews {
            Some(reviews) => format!("PUBLISHED FACT-CHECKS:\n{reviews}\n\n"),
            None => String::new(),
        };

        format!(
            "Current Date: {today}\n\n\
             Review these source contents regarding the following claim and provide a clear analysis.\n\n\
             CLAIM: {claim}\n\n\
             SOURCE CONTENTS:\n{evidence}\n\n\
             {prior}\
             INSTRUCTIONS:\n\
             1. Carefully analyze what each source says about the specific claim\n\
             2. Look for concrete evidence, numbers, and verifiable facts\n\
             3. Compare information across sources\n\
             4. Consider the reliability and recency of sources\n\
             5. Based SOLELY on the available source content, provide a clear verdict\n\
             6. If sources are dated before {today}, consider if information might be outdated\n\
             7. Identify any conflicting information between sources\n\
             8. Pay special attention to any RHETORIC ISSUES mentioned with sources\n\
             9. Sources can present accurate facts despite emotional language\n\
             10. Be especially skeptical when the ONLY supporting evidence comes from sources with rhetoric issues\n\n\
             FORMAT YOUR RESPONSE AS:\n\
             VERDICT: Choose ONE of these options based on the evidence:\n\
             - CONFIRMED (when multiple reliable sources clearly support the claim)\n\
             - FALSE (when multiple reliable sources clearly contradict the claim)\n\
             - PARTIALLY TRUE (when some aspects are true but others are not)\n\
             - UNVERIFIABLE (ONLY if sources don't provide enough evidence)\n\n\
             EVIDENCE:\n[20-30 words as a list of specific facts, numbers, and quotes from sources that support your verdict]\n\n\
             SOURCE SUMMARY:\n[20 word summary of what each source says]\n\n\
             RHETORIC ASSESSMENT: [Briefly note if any sources show evidence of problematic language that affects reliability]\n\n\
             CONCLUSION:\n[2-3 sentence final assessment that clearly explains your verdict]\n\n\
             Be decisive when evidence is clear. Choose UNVERIFIABLE only as a last resort when sources truly don't address the claim.",
            claim = self.claim,
            evidence = self.evidence,
        )
    }
}

// --- VerdictOracle trait ---

/// External judgment over a claim and its evidence. Returns raw text;
/// parsing belongs to rendering.
#[async_trait]
pub trait VerdictOracle: Send + Sync {
    async fn judge(&self, request: &OracleRequest) -> Result<String>;
}

/// Oracle backed by a generative model, one rate-limited call per claim.
pub struct ModelOracle {
    model: Arc<dyn TextModel>,
    limiter: Arc<RateLimiter>,
}

impl ModelOracle {
    pub fn new(model: Arc<dyn TextModel>, limiter: Arc<RateLimiter>) -> Self {
        Self { model, limiter }
    }
}

#[async_trait]
impl VerdictOracle for ModelOracle {
    async fn judge(&self, request: &OracleRequest) -> Result<String> {
        self.limiter.acquire().await;
        info!(model = self.model.name(), claim = request.claim.as_str(), "Requesting verdict");

        let answer = self
            .model
            .generate(&request.prompt())
            .await
            .context("Verdict request failed")?;

        info!(chars = answer.len(), "Verdict received");
        Ok(answer)
    }
}

// --- Evidence serialization ---

pub const NO_SOURCES: &str = "No sources were found for this claim. \
The search returned no readable pages, so there is no source content to review.";

/// Renders a bundle as labelled source blocks under a total character cap.
/// Blocks that would overflow the cap are left out and counted.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceSerializer {
    max_chars: usize,
}

impl EvidenceSerializer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn serialize(&self, bundle: &EvidenceBundle) -> String {
        if bundle.is_empty() {
            return NO_SOURCES.to_string();
        }

        let mut out = String::from("Source Content:\n");
        let mut used = out.chars().count();
        let mut omitted = 0usize;

        for item in &bundle.items {
            let block = source_block(item);
            let len = block.chars().count();
            if used + len > self.max_chars {
                omitted += 1;
                continue;
            }
            used += len;
            out.push_str(&block);
        }

        if omitted > 0 {
            info!(omitted, max_chars = self.max_chars, "Evidence blocks omitted for length");
            out.push_str(&format!(
                "\n[{omitted} more source(s) omitted to fit the length limit]\n"
            ));
        }
        out
    }
}

fn source_block(item: &EvidenceItem) -> String {
    let result = &item.search_result;
    let title = result.title.replace('\n', " ");
    let snippet = result.snippet.replace('\n', " ");
    let rhetoric = match &item.rhetoric {
        Some(flag) if !flag.is_empty() => format!("⚠️ Rhetoric issues: {flag}\n"),
        _ => String::new(),
    };
    let content = item
        .scraped
        .as_ref()
        .map(|s| s.extracted_text.as_str())
        .unwrap_or("");

    format!(
        "\n=== Source {rank}: [{domain}] {title} ===\n{rhetoric}Snippet: {snippet}\n\nContent:\n{content}\n---\n",
        rank = result.rank,
        domain = result.source_domain(),
    )
}

/// One line per published review, or `None` when there are none.
pub fn serialize_prior_reviews(reviews: &[PriorReview]) -> Option<String> {
    if reviews.is_empty() {
        return None;
    }
    let lines = reviews
        .iter()
        .map(|r| {
            let publisher = r.publisher.as_deref().unwrap_or("Unknown publisher");
            let rating = r.rating.as_deref().unwrap_or("no rating");
            format!("- {publisher} rated \"{}\" as {rating} ({})", r.claim_text, r.url)
        })
        .collect::<Vec<_>>()
        .join("\n");
    Some(lines)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use groundcheck_common::{RhetoricLabel, ScrapedContent};

    use super::*;
    use crate::testing::{ranked, review, MockTextModel};

    fn item(rank: usize, text: &str) -> EvidenceItem {
        EvidenceItem {
            search_result: ranked(rank, &format!("https://www.source{rank}.org/story")),
            scraped: Some(ScrapedContent {
                source_url: format!("https://www.source{rank}.org/story"),
                extracted_text: text.to_string(),
                truncated: false,
            }),
            rhetoric: None,
        }
    }

    #[test]
    fn empty_bundle_says_no_sources() {
        let text = EvidenceSerializer::new(24_000).serialize(&EvidenceBundle::empty(Claim::new("x")));
        assert!(text.starts_with("No sources were found"));
    }

    #[test]
    fn blocks_carry_rank_domain_and_rhetoric() {
        let mut flagged = item(2, "beta body");
        flagged.rhetoric = Some(std::iter::once(RhetoricLabel::Clickbait).collect());
        let bundle = EvidenceBundle::from_items(Claim::new("x"), vec![item(1, "alpha body"), flagged]);

        let text = EvidenceSerializer::new(24_000).serialize(&bundle);
        assert!(text.contains("=== Source 1: [www.source1.org] Source 1 ==="));
        assert!(text.contains("=== Source 2: [www.source2.org] Source 2 ===\n⚠️ Rhetoric issues: Clickbait\n"));
        assert!(text.contains("Content:\nalpha body\n---"));
        assert!(text.find("Source 1").unwrap() < text.find("Source 2").unwrap());
    }

    #[test]
    fn overflowing_blocks_are_omitted_and_counted() {
        let bundle = EvidenceBundle::from_items(
            Claim::new("x"),
            vec![item(1, &"a".repeat(300)), item(2, &"b".repeat(300)), item(3, "short")],
        );
        let text = EvidenceSerializer::new(500).serialize(&bundle);
        assert!(text.contains("Source 1"));
        assert!(!text.contains("Source 2:"));
        assert!(text.contains("Source 3"));
        assert!(text.contains("[1 more source(s) omitted"));
    }

    #[test]
    fn prompt_includes_every_section() {
        let request = OracleRequest {
            claim: Claim::new("the sky is green"),
            evidence: NO_SOURCES.to_string(),
            prior_reviews: serialize_prior_reviews(&[review("PolitiFact", "False", "https://p.com/1")]),
            today: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
        };
        let prompt = request.prompt();
        assert!(prompt.starts_with("Current Date: March 04, 2025"));
        assert!(prompt.contains("CLAIM: the sky is green"));
        assert!(prompt.contains(NO_SOURCES));
        assert!(prompt.contains("- PolitiFact rated \"claim under review\" as False (https://p.com/1)"));
        for heading in ["VERDICT:", "EVIDENCE:", "SOURCE SUMMARY:", "RHETORIC ASSESSMENT:", "CONCLUSION:"] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn no_prior_reviews_means_no_section() {
        assert!(serialize_prior_reviews(&[]).is_none());
        let request = OracleRequest::new(Claim::new("x"), NO_SOURCES.to_string(), None);
        assert!(!request.prompt().contains("PUBLISHED FACT-CHECKS"));
    }

    #[tokio::test]
    async fn model_oracle_sends_the_prompt() {
        let model = Arc::new(MockTextModel::new().with_reply("VERDICT: FALSE"));
        let limiter = Arc::new(RateLimiter::new("oracle", 100, Duration::from_secs(60)).unwrap());
        let oracle = ModelOracle::new(model.clone(), limiter);

        let request = OracleRequest::new(Claim::new("the sky is green"), NO_SOURCES.to_string(), None);
        let answer = oracle.judge(&request).await.unwrap();

        assert_eq!(answer, "VERDICT: FALSE");
        assert_eq!(model.prompts(), vec![request.prompt()]);
    }
}
