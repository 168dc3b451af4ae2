use groundcheck_common::{PriorReview, Verdict, VerdictLabel};

/// Shown whenever the oracle fails or answers without a usable verdict.
pub const ORACLE_FALLBACK: &str = "⚠️ Unable to analyze sources due to an API error.";

pub fn marker(label: VerdictLabel) -> &'static str {
    match label {
        VerdictLabel::Confirmed => "✅",
        VerdictLabel::False => "❌",
        VerdictLabel::PartiallyTrue => "⚠️",
        VerdictLabel::Unverifiable => "❓",
    }
}

/// Chat-ready text for a parsed verdict. Missing sections are skipped.
pub fn render_verdict(verdict: &Verdict) -> String {
    let mut out = format!(
        "📊 **Fact Check Analysis:**\n\n{} VERDICT: {}",
        marker(verdict.label),
        verdict.label
    );

    let sections = [
        ("📊 EVIDENCE:", &verdict.evidence),
        ("📚 SOURCE SUMMARY:", &verdict.source_summary),
        ("RHETORIC ASSESSMENT:", &verdict.rhetoric_assessment),
        ("📝 CONCLUSION:", &verdict.conclusion),
    ];
    for (heading, body) in sections {
        if let Some(body) = body {
            out.push_str(&format!("\n\n{heading}\n{body}"));
        }
    }
    out
}

/// Short list of published fact-checks, appended under the verdict.
pub fn render_prior_reviews(reviews: &[PriorReview]) -> Option<String> {
    if reviews.is_empty() {
        return None;
    }
    let mut out = String::from("🔎 Published fact-checks:");
    for review in reviews {
        let publisher = review.publisher.as_deref().unwrap_or("Unknown publisher");
        let rating = review.rating.as_deref().unwrap_or("unrated");
        out.push_str(&format!("\n- {publisher}: {rating} ({})", review.url));
    }
    Some(out)
}
