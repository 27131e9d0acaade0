//! VideoOrchestrator - tries each provider in order until one yields a URL.

use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::gemini::GeminiClient;
use super::provider::VideoProvider;
use super::request::GenerationRequest;
use super::storage::VideoStore;
use super::veo3gen::Veo3GenClient;
use crate::config::Config;

/// Outcome of one orchestration. `None` means no provider produced a video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub video_url: Option<String>,
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        self.video_url.is_some()
    }
}

/// Sequential fallback over an ordered list of providers.
#[derive(Clone, Default)]
pub struct VideoOrchestrator {
    providers: Vec<Arc<dyn VideoProvider>>,
}

impl VideoOrchestrator {
    pub fn new(providers: Vec<Arc<dyn VideoProvider>>) -> Self {
        Self { providers }
    }

    /// Build the standard chain, Veo3Gen first and Gemini second.
    ///
    /// A provider without credentials is left out with a warning, so requests
    /// fall straight through to the next one without touching the network.
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let mut orchestrator = Self::default();

        match Veo3GenClient::with_clock(&config.veo3gen, clock) {
            Ok(client) => orchestrator.push(Arc::new(client)),
            Err(e) if e.is_configuration() => log::warn!("Veo3 Gen provider disabled: {}", e),
            Err(e) => log::error!("Failed to create Veo3 Gen client: {}", e),
        }

        let store = VideoStore::new(config.storage.videos_dir.clone());
        match GeminiClient::from_config(&config.gemini, store) {
            Ok(client) => orchestrator.push(Arc::new(client)),
            Err(e) if e.is_configuration() => log::warn!("Google Veo3 provider disabled: {}", e),
            Err(e) => log::error!("Failed to create Google Veo3 client: {}", e),
        }

        orchestrator
    }

    /// Append a provider to the end of the fallback chain.
    pub fn push(&mut self, provider: Arc<dyn VideoProvider>) {
        self.providers.push(provider);
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try providers in order; the first URL wins and later ones are never called.
    pub async fn generate_video(&self, request: &GenerationRequest) -> GenerationResult {
        log::info!(
            "Starting video generation for prompt: {}...",
            request.prompt_preview()
        );
        match request.model {
            Some(model) => log::info!("Using video model: {}", model.as_str()),
            None => log::info!("Using video model: auto-detected from quality"),
        }

        for (index, provider) in self.providers.iter().enumerate() {
            if index > 0 {
                log::info!("Falling back to {}...", provider.name());
            }

            match provider.generate(request).await {
                Ok(url) => {
                    log::info!("Successfully generated video with {}", provider.name());
                    return GenerationResult {
                        video_url: Some(url),
                    };
                }
                Err(e) => log::warn!("{} failed: {}", provider.name(), e),
            }
        }

        log::error!("Video generation failed with all providers");
        GenerationResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::error::ProviderError;
    use crate::video::request::{AspectRatio, Quality};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that returns a canned outcome and counts calls.
    struct StubProvider {
        name: &'static str,
        url: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(name: &'static str, url: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                url,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VideoProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.url
                .map(str::to_string)
                .ok_or(ProviderError::GenerationFailed {
                    message: "stub failure".to_string(),
                })
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("sunrise", AspectRatio::Landscape, Quality::P720, None)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let a = StubProvider::new("a", Some("https://a/video.mp4"));
        let b = StubProvider::new("b", Some("/videos/b.mp4"));
        let orchestrator =
            VideoOrchestrator::new(vec![a.clone() as Arc<dyn VideoProvider>, b.clone()]);

        let result = orchestrator.generate_video(&request()).await;

        assert_eq!(result.video_url.as_deref(), Some("https://a/video.mp4"));
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_when_first_fails() {
        let a = StubProvider::new("a", None);
        let b = StubProvider::new("b", Some("/videos/b.mp4"));
        let orchestrator =
            VideoOrchestrator::new(vec![a.clone() as Arc<dyn VideoProvider>, b.clone()]);

        let result = orchestrator.generate_video(&request()).await;

        assert_eq!(result.video_url.as_deref(), Some("/videos/b.mp4"));
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_fail_returns_none() {
        let a = StubProvider::new("a", None);
        let b = StubProvider::new("b", None);
        let orchestrator =
            VideoOrchestrator::new(vec![a.clone() as Arc<dyn VideoProvider>, b.clone()]);

        let result = orchestrator.generate_video(&request()).await;

        assert!(!result.is_success());
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_providers_returns_none() {
        let result = VideoOrchestrator::default().generate_video(&request()).await;
        assert_eq!(result, GenerationResult::default());
    }

    #[test]
    fn test_from_config_skips_providers_without_keys() {
        let mut config = Config::default();
        assert!(VideoOrchestrator::from_config(&config).provider_names().is_empty());

        config.gemini.api_key = Some("google".to_string());
        assert_eq!(
            VideoOrchestrator::from_config(&config).provider_names(),
            vec!["Google Veo3"]
        );

        config.veo3gen.api_key = Some("veo".to_string());
        assert_eq!(
            VideoOrchestrator::from_config(&config).provider_names(),
            vec!["Veo3 Gen", "Google Veo3"]
        );
    }

    #[test]
    fn test_from_config_skips_veo3gen_with_zero_poll_interval() {
        let mut config = Config::default();
        config.veo3gen.api_key = Some("veo".to_string());
        config.veo3gen.poll_interval_secs = 0;
        config.gemini.api_key = Some("google".to_string());

        assert_eq!(
            VideoOrchestrator::from_config(&config).provider_names(),
            vec!["Google Veo3"]
        );
    }
}
