use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use ai_client::TextModel;
use anyhow::{Context, Result};
use async_trait::async_trait;
use groundcheck_common::{RhetoricFlag, RhetoricLabel, SearchResult};
use regex::Regex;
use tracing::{debug, info};

use crate::rate_limiter::RateLimiter;

/// Labels sources whose title or snippet reads as sensational. Advisory only.
#[async_trait]
pub trait RhetoricAnalyzer: Send + Sync {
    /// Flags keyed by 0-based position in `results`. Sources without
    /// problems are simply absent from the map.
    async fn analyze(&self, results: &[SearchResult]) -> Result<HashMap<usize, RhetoricFlag>>;
    fn name(&self) -> &str;
}

// =============================================================================
// Keyword patterns
// =============================================================================

/// Only the opening of `title + snippet` is scanned.
const KEYWORD_WINDOW_CHARS: usize = 300;

static RE_BREAKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:BREAKING|URGENT)\b").unwrap());
static RE_CLICKBAIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:won'?t believe|shocking|mind-?blowing|you need to see|what happened next)\b")
        .unwrap()
});
static RE_HYPERBOLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:incredible|amazing|unbelievable|revolutionary|devastat\w*|catastroph\w*)\b")
        .unwrap()
});
static RE_EMOTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:terrifying|horrific|alarming|outrage\w*|anger|furious|hate)\b").unwrap()
});

/// Regex pass over one title and snippet.
pub fn detect_rhetoric_fast(title: &str, snippet: &str) -> RhetoricFlag {
    let text: String = format!("{title} {snippet}")
        .chars()
        .take(KEYWORD_WINDOW_CHARS)
        .collect();

    let checks: [(&LazyLock<Regex>, RhetoricLabel); 4] = [
        (&RE_BREAKING, RhetoricLabel::Breaking),
        (&RE_CLICKBAIT, RhetoricLabel::Clickbait),
        (&RE_HYPERBOLE, RhetoricLabel::Hyperbole),
        (&RE_EMOTIONAL, RhetoricLabel::Emotional),
    ];

    checks
        .into_iter()
        .filter(|(re, _)| re.is_match(&text))
        .map(|(_, label)| label)
        .collect()
}

/// Local, instant detector. Never calls out.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordRhetoricAnalyzer;

#[async_trait]
impl RhetoricAnalyzer for KeywordRhetoricAnalyzer {
    async fn analyze(&self, results: &[SearchResult]) -> Result<HashMap<usize, RhetoricFlag>> {
        Ok(results
            .iter()
            .enumerate()
            .map(|(i, r)| (i, detect_rhetoric_fast(&r.title, &r.snippet)))
            .filter(|(_, flag)| !flag.is_empty())
            .collect())
    }

    fn name(&self) -> &str {
        "keywords"
    }
}

// =============================================================================
// Model-backed analysis
// =============================================================================

/// One batched model call over every headline and snippet.
pub struct ModelRhetoricAnalyzer {
    model: Arc<dyn TextModel>,
    limiter: Arc<RateLimiter>,
}

impl ModelRhetoricAnalyzer {
    pub fn new(model: Arc<dyn TextModel>, limiter: Arc<RateLimiter>) -> Self {
        Self { model, limiter }
    }
}

fn build_prompt(results: &[SearchResult]) -> String {
    let listing = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. TITLE: {}\nSNIPPET: {}",
                i + 1,
                r.title.replace('\n', " "),
                r.snippet.replace('\n', " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these news headlines and snippets for problematic rhetoric:\n\n\
         {listing}\n\n\
         For each headline, identify if it contains any of these problematic elements:\n\
         - Sensationalism (exaggerated claims to provoke reaction)\n\
         - Clickbait (misleading or withholding info to generate clicks)\n\
         - Emotional manipulation (exploiting emotions rather than presenting facts)\n\
         - Loaded language (biased terms that suggest a conclusion)\n\
         - Sarcasm (mocking tone that means opposite of what's said)\n\n\
         For each headline, respond with ONLY the headline number and any issues found, like:\n\
         1: Sensationalism, Loaded language\n\
         2: None\n\
         etc."
    )
}

/// Parse `N: label, label` lines. `N` is 1-based in the answer and 0-based
/// in the returned map. Lines that do not parse, or name a headline outside
/// `0..count`, are skipped.
pub fn parse_rhetoric_lines(text: &str, count: usize) -> HashMap<usize, RhetoricFlag> {
    let mut flags: HashMap<usize, RhetoricFlag> = HashMap::new();

    for line in text.lines() {
        let Some((num, issues)) = line.split_once(':') else {
            continue;
        };
        let num = num.trim().trim_matches(|c: char| c == '*' || c == '-' || c == '.');
        let Ok(n) = num.trim().parse::<usize>() else {
            continue;
        };
        if n == 0 || n > count {
            continue;
        }

        let flag: RhetoricFlag = issues.split(',').filter_map(RhetoricLabel::parse).collect();
        if !flag.is_empty() {
            flags.entry(n - 1).or_default().merge(flag);
        }
    }

    flags
}

#[async_trait]
impl RhetoricAnalyzer for ModelRhetoricAnalyzer {
    async fn analyze(&self, results: &[SearchResult]) -> Result<HashMap<usize, RhetoricFlag>> {
        if results.is_empty() {
            return Ok(HashMap::new());
        }

        self.limiter.acquire().await;
        debug!(
            model = self.model.name(),
            headlines = results.len(),
            "Requesting rhetoric analysis"
        );

        let answer = self
            .model
            .generate(&build_prompt(results))
            .await
            .context("Rhetoric analysis request failed")?;

        let flags = parse_rhetoric_lines(&answer, results.len());
        info!(headlines = results.len(), flagged = flags.len(), "Rhetoric analysis complete");
        Ok(flags)
    }

    fn name(&self) -> &str {
        "model"
    }
}
