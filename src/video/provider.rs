//! Common capability interface for video providers.

use async_trait::async_trait;

use super::error::ProviderError;
use super::request::GenerationRequest;

/// A backend that turns a prompt into a video URL.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Generate a video and return a URL the caller can fetch it from.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}
