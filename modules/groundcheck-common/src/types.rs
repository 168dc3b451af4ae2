use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Claim ---

/// The user-supplied statement to check. No structure is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claim(String);

impl Claim {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the claim is a bare http(s) link rather than a statement.
    pub fn is_url(&self) -> bool {
        let text = self.0.as_str();
        if text.contains(char::is_whitespace) {
            return false;
        }
        (text.starts_with("http://") || text.starts_with("https://"))
            && url::Url::parse(text).is_ok()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Search ---

/// One candidate source, in the order the search index ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// 1-based position in the index's relevance order.
    pub rank: usize,
}

impl SearchResult {
    /// Host part of the URL, falling back to the raw URL when it does not parse.
    pub fn source_domain(&self) -> String {
        source_domain(&self.url)
    }
}

pub fn source_domain(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| raw.to_string())
}

// --- Rhetoric ---

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhetoricLabel {
    Breaking,
    Clickbait,
    Hyperbole,
    Emotional,
    Sensationalism,
    EmotionalManipulation,
    LoadedLanguage,
    Sarcasm,
    Other(String),
}

impl RhetoricLabel {
    /// Map a free-text label (as written by a model) onto the closed set.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().trim_end_matches('.').to_lowercase();
        let label = match normalized.as_str() {
            "" | "none" | "n/a" => return None,
            "breaking" | "urgent" => RhetoricLabel::Breaking,
            "clickbait" | "click-bait" | "click bait" => RhetoricLabel::Clickbait,
            "hyperbole" => RhetoricLabel::Hyperbole,
            "emotional" => RhetoricLabel::Emotional,
            "sensationalism" | "sensational" => RhetoricLabel::Sensationalism,
            "emotional manipulation" => RhetoricLabel::EmotionalManipulation,
            "loaded language" => RhetoricLabel::LoadedLanguage,
            "sarcasm" | "sarcastic" => RhetoricLabel::Sarcasm,
            _ => RhetoricLabel::Other(raw.trim().to_string()),
        };
        Some(label)
    }
}

impl fmt::Display for RhetoricLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RhetoricLabel::Breaking => write!(f, "BREAKING"),
            RhetoricLabel::Clickbait => write!(f, "Clickbait"),
            RhetoricLabel::Hyperbole => write!(f, "Hyperbole"),
            RhetoricLabel::Emotional => write!(f, "Emotional"),
            RhetoricLabel::Sensationalism => write!(f, "Sensationalism"),
            RhetoricLabel::EmotionalManipulation => write!(f, "Emotional manipulation"),
            RhetoricLabel::LoadedLanguage => write!(f, "Loaded language"),
            RhetoricLabel::Sarcasm => write!(f, "Sarcasm"),
            RhetoricLabel::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Advisory set of rhetoric labels for one source. Never blocks inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RhetoricFlag(BTreeSet<RhetoricLabel>);

impl RhetoricFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: RhetoricLabel) {
        self.0.insert(label);
    }

    pub fn contains(&self, label: &RhetoricLabel) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &RhetoricLabel> {
        self.0.iter()
    }

    pub fn merge(&mut self, other: RhetoricFlag) {
        self.0.extend(other.0);
    }
}

impl FromIterator<RhetoricLabel> for RhetoricFlag {
    fn from_iter<I: IntoIterator<Item = RhetoricLabel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RhetoricFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

// --- Evidence ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub source_url: String,
    pub extracted_text: String,
    /// True when the head+tail cut was applied.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub search_result: SearchResult,
    pub scraped: Option<ScrapedContent>,
    pub rhetoric: Option<RhetoricFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    /// No source survived search and fetch. A terminal state, not an error.
    NoEvidence,
    Found,
}

/// Ordered evidence for one claim. May be empty, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub claim: Claim,
    pub items: Vec<EvidenceItem>,
    pub status: EvidenceStatus,
}

impl EvidenceBundle {
    pub fn empty(claim: Claim) -> Self {
        Self {
            claim,
            items: Vec::new(),
            status: EvidenceStatus::NoEvidence,
        }
    }

    /// Build a bundle from survivors; items are re-sorted by rank.
    pub fn from_items(claim: Claim, mut items: Vec<EvidenceItem>) -> Self {
        items.sort_by_key(|i| i.search_result.rank);
        let status = if items.is_empty() {
            EvidenceStatus::NoEvidence
        } else {
            EvidenceStatus::Found
        };
        Self {
            claim,
            items,
            status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn ranks(&self) -> Vec<usize> {
        self.items.iter().map(|i| i.search_result.rank).collect()
    }
}

// --- Prior fact-checks ---

/// A fact-check already published by a third party for a matching claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorReview {
    pub claim_text: String,
    pub claimant: Option<String>,
    pub publisher: Option<String>,
    pub url: String,
    pub rating: Option<String>,
    pub review_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rank: usize) -> SearchResult {
        SearchResult {
            title: format!("Result {rank}"),
            url: format!("https://example{rank}.com/a"),
            snippet: String::new(),
            rank,
        }
    }

    #[test]
    fn claim_detects_urls() {
        assert!(Claim::new("https://example.com/story").is_url());
        assert!(Claim::new("  http://example.com  ").is_url());
        assert!(!Claim::new("the sky is green").is_url());
        assert!(!Claim::new("https://example.com says the sky is green").is_url());
        assert!(!Claim::new("ftp://example.com").is_url());
    }

    #[test]
    fn source_domain_strips_scheme_and_path() {
        assert_eq!(source_domain("https://www.bbc.co.uk/news/123"), "www.bbc.co.uk");
        assert_eq!(source_domain("not a url"), "not a url");
    }

    #[test]
    fn bundle_from_items_sorts_by_rank() {
        let items = [3, 1, 2]
            .into_iter()
            .map(|r| EvidenceItem {
                search_result: result(r),
                scraped: None,
                rhetoric: None,
            })
            .collect();
        let bundle = EvidenceBundle::from_items(Claim::new("x"), items);
        assert_eq!(bundle.ranks(), vec![1, 2, 3]);
        assert_eq!(bundle.status, EvidenceStatus::Found);
    }

    #[test]
    fn empty_bundle_is_no_evidence() {
        let bundle = EvidenceBundle::from_items(Claim::new("x"), Vec::new());
        assert!(bundle.is_empty());
        assert_eq!(bundle.status, EvidenceStatus::NoEvidence);
        assert_eq!(bundle, EvidenceBundle::empty(Claim::new("x")));
    }

    #[test]
    fn rhetoric_labels_parse_model_wording() {
        assert_eq!(RhetoricLabel::parse("Loaded language"), Some(RhetoricLabel::LoadedLanguage));
        assert_eq!(
            RhetoricLabel::parse(" emotional manipulation."),
            Some(RhetoricLabel::EmotionalManipulation)
        );
        assert_eq!(RhetoricLabel::parse("None"), None);
        assert_eq!(
            RhetoricLabel::parse("Fearmongering"),
            Some(RhetoricLabel::Other("Fearmongering".into()))
        );
    }

    #[test]
    fn rhetoric_flag_displays_sorted_labels() {
        let flag: RhetoricFlag = [RhetoricLabel::Sarcasm, RhetoricLabel::Clickbait]
            .into_iter()
            .collect();
        assert_eq!(flag.to_string(), "Clickbait, Sarcasm");
    }
}
