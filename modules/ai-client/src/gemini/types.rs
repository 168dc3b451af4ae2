use serde::{Deserialize, Serialize};

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    pub fn new() -> Self {
        Self {
            contents: Vec::new(),
            generation_config: None,
        }
    }

    pub fn user(mut self, parts: Vec<Part>) -> Self {
        self.contents.push(Content {
            role: Some("user".to_string()),
            parts,
        });
        self
    }

    pub fn config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, base64_data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: base64_data,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Finish reasons that mean the candidate was cut by a filter.
const BLOCKING_FINISH_REASONS: [&str; 4] =
    ["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT"];

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why the prompt or the first candidate was withheld, if it was.
    pub fn block_reason(&self) -> Option<&str> {
        let prompt = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref());
        prompt.or_else(|| {
            let candidate = self.candidates.first()?;
            let reason = candidate.finish_reason.as_deref()?;
            let filtered = BLOCKING_FINISH_REASONS.iter().any(|r| *r == reason);
            (filtered && self.text().is_none()).then_some(reason)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let req = GenerateRequest::new()
            .user(vec![Part::text("hi"), Part::inline("image/png", "AAAA".into())])
            .config(GenerationConfig {
                temperature: Some(0.2),
                max_output_tokens: Some(100),
                response_mime_type: None,
            });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn response_text_joins_parts() {
        let resp: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "VERDICT: "}, {"text": "FALSE"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("VERDICT: FALSE"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let resp: GenerateResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(resp.text().is_none());
        assert_eq!(resp.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn safety_finish_without_text_is_blocked() {
        let resp: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(resp.block_reason(), Some("SAFETY"));

        let finished: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "VERDICT: FALSE"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert!(finished.block_reason().is_none());
    }
}
