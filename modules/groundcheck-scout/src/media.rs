use std::sync::{Arc, LazyLock};

use ai_client::TextModel;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::rate_limiter::RateLimiter;

const EXTRACT_TEXT_PROMPT: &str =
    "Extract the text in the image verbatim. Only return the exact text from the image.";

const MANIPULATION_PROMPT: &str = "Analyze this image carefully for signs of manipulation, AI generation, or deepfake indicators. \
Look closely for these telltale signs: \
1. Unnatural facial features (eyes, teeth, ears) \
2. Inconsistent lighting or shadows \
3. Blurry or warped backgrounds \
4. Artificial texture in skin or hair \
5. Misaligned facial features \
6. Unnatural color patterns \
7. Artifacts around face boundaries \
8. Inconsistent image quality across the image\n\n\
Provide your analysis with a rating from 1-10 on how likely this is to be a deepfake or AI-generated image, where: \
1-3: Likely authentic image \
4-6: Some suspicious elements but inconclusive \
7-10: Strong indicators of manipulation/generation\n\n\
Format your response like this:\n\
DEEPFAKE LIKELIHOOD: [1-10]\n\
EVIDENCE: [List the specific visual anomalies you observed]\n\
CONCLUSION: [2-3 sentence summary explaining your rating]";

static RE_LIKELIHOOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DEEPFAKE LIKELIHOOD:\s*\**\s*(\d{1,2})").unwrap());

/// Model's opinion on whether an image was manipulated or generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManipulationAssessment {
    /// 1 (likely authentic) to 10 (strong indicators), when the model gave one.
    pub likelihood: Option<u8>,
    pub analysis: String,
}

impl ManipulationAssessment {
    pub fn from_answer(answer: &str) -> Self {
        let analysis = answer.trim().to_string();
        let likelihood = RE_LIKELIHOOD
            .captures(&analysis)
            .and_then(|c| c[1].parse::<u8>().ok())
            .filter(|n| (1..=10).contains(n));
        Self {
            likelihood,
            analysis,
        }
    }

    pub fn render(&self) -> String {
        let mut text = self.analysis.clone();
        if let Some(score) = self.likelihood {
            let marker = match score {
                1..=3 => "🟢",
                4..=6 => "🟠",
                _ => "🔴",
            };
            let marked = format!("{marker} DEEPFAKE LIKELIHOOD:");
            text = text.replacen("DEEPFAKE LIKELIHOOD:", &marked, 1);
        }
        text = text
            .replacen("EVIDENCE:", "🔍 EVIDENCE:", 1)
            .replacen("CONCLUSION:", "📝 CONCLUSION:", 1);
        format!("📊 **Deepfake Analysis:**\n\n{text}")
    }
}

/// Image questions answered by a vision model, sharing the oracle limiter.
pub struct MediaAnalyzer {
    vision: Arc<dyn TextModel>,
    limiter: Arc<RateLimiter>,
}

impl MediaAnalyzer {
    pub fn new(vision: Arc<dyn TextModel>, limiter: Arc<RateLimiter>) -> Self {
        Self { vision, limiter }
    }

    /// Verbatim text printed in the image, or `None` when there is none.
    pub async fn extract_claim_text(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<Option<String>> {
        self.limiter.acquire().await;
        let text = self
            .vision
            .describe_image(bytes, mime_type, EXTRACT_TEXT_PROMPT)
            .await
            .context("Image text extraction failed")?;

        let text = text.trim();
        info!(bytes = bytes.len(), chars = text.len(), "Image text extracted");
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    pub async fn assess_manipulation(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ManipulationAssessment> {
        self.limiter.acquire().await;
        let answer = self
            .vision
            .describe_image(bytes, mime_type, MANIPULATION_PROMPT)
            .await
            .context("Manipulation analysis failed")?;

        let assessment = ManipulationAssessment::from_answer(&answer);
        info!(
            bytes = bytes.len(),
            likelihood = assessment.likelihood,
            "Manipulation analysis complete"
        );
        Ok(assessment)
    }
}
