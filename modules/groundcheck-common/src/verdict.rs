use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Whole-word labels, with an optional negation captured so it can be skipped.
static RE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(NOT\s+)?(CONFIRMED|FALSE|PARTIALLY\s+TRUE|UNVERIFIABLE)\b").unwrap()
});

/// Closed set of verdicts the oracle is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictLabel {
    Confirmed,
    False,
    PartiallyTrue,
    Unverifiable,
}

impl VerdictLabel {
    pub const ALL: [VerdictLabel; 4] = [
        VerdictLabel::Confirmed,
        VerdictLabel::False,
        VerdictLabel::PartiallyTrue,
        VerdictLabel::Unverifiable,
    ];

    /// Wording used in prompts and in oracle answers.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Confirmed => "CONFIRMED",
            VerdictLabel::False => "FALSE",
            VerdictLabel::PartiallyTrue => "PARTIALLY TRUE",
            VerdictLabel::Unverifiable => "UNVERIFIABLE",
        }
    }

    /// Find the earliest verdict label mentioned in `text` as a whole word.
    /// Negated labels (`NOT CONFIRMED`) and prefixed words (`UNCONFIRMED`)
    /// do not count.
    pub fn find_in(text: &str) -> Option<Self> {
        let upper = text.to_uppercase().replace('_', " ");
        RE_LABEL
            .captures_iter(&upper)
            .filter(|caps| caps.get(1).is_none())
            .find_map(|caps| {
                let word = caps.get(2)?.as_str();
                let word = word.split_whitespace().collect::<Vec<_>>().join(" ");
                VerdictLabel::ALL
                    .into_iter()
                    .find(|label| label.as_str() == word)
            })
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields of an oracle answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: VerdictLabel,
    pub evidence: Option<String>,
    pub source_summary: Option<String>,
    pub rhetoric_assessment: Option<String>,
    pub conclusion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Verdict,
    Evidence,
    SourceSummary,
    RhetoricAssessment,
    Conclusion,
}

const HEADINGS: [(&str, Section); 5] = [
    ("VERDICT", Section::Verdict),
    ("EVIDENCE", Section::Evidence),
    ("SOURCE SUMMARY", Section::SourceSummary),
    ("RHETORIC ASSESSMENT", Section::RhetoricAssessment),
    ("CONCLUSION", Section::Conclusion),
];

/// Recognise `HEADING: rest`, tolerating markdown emphasis around the heading.
fn heading(line: &str) -> Option<(Section, &str)> {
    let cleaned = line.trim().trim_start_matches(['*', '#', ' ']);
    let (head, rest) = cleaned.split_once(':')?;
    let head = head.trim_end_matches('*').trim().to_uppercase();
    HEADINGS
        .iter()
        .find(|(name, _)| head == *name)
        .map(|(_, section)| (*section, rest.trim_start_matches('*').trim()))
}

impl Verdict {
    /// Parse the section template out of free oracle text. Returns `None`
    /// when no verdict label can be found, which callers treat as malformed.
    pub fn parse(text: &str) -> Option<Self> {
        let mut sections: Vec<(Section, String)> = Vec::new();

        for line in text.lines() {
            if let Some((section, rest)) = heading(line) {
                sections.push((section, rest.to_string()));
            } else if let Some((_, body)) = sections.last_mut() {
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str(line);
            }
        }

        let take = |wanted: Section| {
            sections
                .iter()
                .find(|(s, _)| *s == wanted)
                .map(|(_, body)| body.trim().to_string())
                .filter(|body| !body.is_empty())
        };

        let label = take(Section::Verdict).and_then(|v| VerdictLabel::find_in(&v))?;

        Some(Self {
            label,
            evidence: take(Section::Evidence),
            source_summary: take(Section::SourceSummary),
            rhetoric_assessment: take(Section::RhetoricAssessment),
            conclusion: take(Section::Conclusion),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "VERDICT: FALSE\n\n\
        EVIDENCE:\n- NASA: the sky scatters blue light\n- 450nm dominant\n\n\
        SOURCE SUMMARY:\nAll sources describe Rayleigh scattering.\n\n\
        RHETORIC ASSESSMENT: None of the sources use loaded language.\n\n\
        CONCLUSION:\nThe sky is blue, not green.";

    #[test]
    fn parses_all_sections() {
        let verdict = Verdict::parse(ANSWER).unwrap();
        assert_eq!(verdict.label, VerdictLabel::False);
        assert_eq!(
            verdict.evidence.as_deref(),
            Some("- NASA: the sky scatters blue light\n- 450nm dominant")
        );
        assert_eq!(
            verdict.source_summary.as_deref(),
            Some("All sources describe Rayleigh scattering.")
        );
        assert_eq!(
            verdict.rhetoric_assessment.as_deref(),
            Some("None of the sources use loaded language.")
        );
        assert_eq!(verdict.conclusion.as_deref(), Some("The sky is blue, not green."));
    }

    #[test]
    fn tolerates_markdown_headings() {
        let text = "**VERDICT:** PARTIALLY TRUE\n\n**EVIDENCE:**\n- one thing";
        let verdict = Verdict::parse(text).unwrap();
        assert_eq!(verdict.label, VerdictLabel::PartiallyTrue);
        assert_eq!(verdict.evidence.as_deref(), Some("- one thing"));
        assert!(verdict.conclusion.is_none());
    }

    #[test]
    fn label_on_following_line() {
        let verdict = Verdict::parse("VERDICT:\nUNVERIFIABLE\n").unwrap();
        assert_eq!(verdict.label, VerdictLabel::Unverifiable);
    }

    #[test]
    fn missing_label_is_malformed() {
        assert!(Verdict::parse("I cannot help with that.").is_none());
        assert!(Verdict::parse("VERDICT: maybe?").is_none());
        assert!(Verdict::parse("VERDICT: UNCONFIRMED\nCONCLUSION: no data").is_none());
        assert!(Verdict::parse("VERDICT: NOT CONFIRMED\nCONCLUSION: no data").is_none());
    }

    #[test]
    fn earliest_label_wins() {
        assert_eq!(
            VerdictLabel::find_in("CONFIRMED (not FALSE)"),
            Some(VerdictLabel::Confirmed)
        );
        assert_eq!(
            VerdictLabel::find_in("partially_true"),
            Some(VerdictLabel::PartiallyTrue)
        );
    }

    #[test]
    fn negated_label_is_skipped_for_a_later_one() {
        assert_eq!(
            VerdictLabel::find_in("not confirmed, so FALSE"),
            Some(VerdictLabel::False)
        );
        assert_eq!(VerdictLabel::find_in("FALSEHOOD"), None);
    }
}
