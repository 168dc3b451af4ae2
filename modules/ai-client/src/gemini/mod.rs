mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::Engine;

use crate::error::AiError;
use crate::traits::TextModel;
use client::GeminiClient;
use types::*;

// =============================================================================
// Gemini Model
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            temperature: 0.2,
            max_output_tokens: 2048,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_output_tokens),
            response_mime_type: Some("text/plain".to_string()),
        }
    }

    async fn send(&self, request: GenerateRequest) -> Result<String, AiError> {
        let response = self.client().generate(&self.model, &request).await?;

        if let Some(reason) = response.block_reason() {
            return Err(AiError::Blocked(reason.to_string()));
        }

        response.text().ok_or(AiError::Empty)
    }

    /// Single-turn text generation.
    pub async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let request = GenerateRequest::new()
            .user(vec![Part::text(prompt)])
            .config(self.generation_config());
        self.send(request).await
    }

    /// Send an image inline alongside a prompt and return the model's text.
    pub async fn describe_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, AiError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let request = GenerateRequest::new()
            .user(vec![Part::inline(mime_type, encoded), Part::text(prompt)])
            .config(self.generation_config());
        self.send(request).await
    }
}

// =============================================================================
// TextModel Implementation
// =============================================================================

#[async_trait]
impl TextModel for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt)
            .await
            .map_err(|e| anyhow!("Gemini {} generation failed: {e}", self.model))
    }

    async fn describe_image(&self, bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        Gemini::describe_image(self, bytes, mime_type, prompt)
            .await
            .map_err(|e| anyhow!("Gemini {} vision request failed: {e}", self.model))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("gem-test", "gemini-2.0-flash");
        assert_eq!(ai.model, "gemini-2.0-flash");
        assert_eq!(ai.api_key, "gem-test");
        assert!((ai.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai =
            Gemini::new("gem-test", "gemini-2.0-flash").with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }

    #[test]
    fn test_generation_config_is_plain_text() {
        let ai = Gemini::new("gem-test", "gemini-2.0-flash").with_max_output_tokens(512);
        let config = ai.generation_config();
        assert_eq!(config.max_output_tokens, Some(512));
        assert_eq!(config.response_mime_type.as_deref(), Some("text/plain"));
    }
}
