use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// TextModel Trait
// =============================================================================

/// A generative model that answers a single prompt, optionally about an image.
///
/// Pipelines hold `Arc<dyn TextModel>` so providers and test doubles can be
/// swapped without touching callers.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    async fn describe_image(&self, bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String>;

    fn name(&self) -> &str;
}
