//! GeminiClient - one synchronous `generateContent` call that may return inline video.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use super::provider::VideoProvider;
use super::request::{validate_prompt, GenerationRequest};
use super::storage::VideoStore;
use crate::config::GeminiConfig;

/// Output mime type requested from the model.
const VIDEO_MIME_TYPE: &str = "video/mp4";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    /// Base64-encoded payload.
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

impl GeminiResponse {
    /// First inline part whose declared mime type mentions video.
    fn into_video_part(self) -> Option<InlineData> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.inline_data)
            .find(|d| d.mime_type.contains("video"))
    }
}

/// Client for the Google Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    http_client: reqwest::Client,
    store: VideoStore,
}

impl GeminiClient {
    /// Create a client that writes decoded videos into `store`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingApiKey` if no API key is configured.
    pub fn from_config(config: &GeminiConfig, store: VideoStore) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            http_client,
            store,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Ask the model for a video and save the returned payload locally.
    ///
    /// Returns the `/videos/...` URL of the saved file.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NoVideoPart` when no part declares a video mime
    /// type, `ProviderError::EmptyVideoData` when the part has no payload,
    /// `ProviderError::ContentBlocked` when the prompt was refused, and
    /// transport, decode or IO errors otherwise.
    pub async fn generate_video(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        validate_prompt(&request.prompt)?;

        log::info!("Starting Google Veo3 video generation...");
        log::info!("Prompt: {}...", request.prompt_preview());

        let body = GeminiRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![TextPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: VIDEO_MIME_TYPE,
            },
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError { status, message });
        }

        let parsed: GeminiResponse = response.json().await?;

        // Blocked prompts still come back as 200.
        if let Some(feedback) = &parsed.prompt_feedback {
            if let Some(block_reason) = &feedback.block_reason {
                let reason = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| block_reason.clone());
                log::warn!("Prompt blocked by Gemini: {}", reason);
                return Err(ProviderError::ContentBlocked { reason });
            }
        }

        let part = parsed.into_video_part().ok_or_else(|| {
            log::error!("No video part found in response");
            ProviderError::NoVideoPart
        })?;
        log::info!("Found video part with mime type: {}", part.mime_type);

        if part.data.is_empty() {
            log::error!("No video data found in the response part");
            return Err(ProviderError::EmptyVideoData);
        }

        let bytes = base64::engine::general_purpose::STANDARD.decode(part.data.as_bytes())?;
        let url = self.store.save(&bytes).await?;

        log::info!("Google Veo3 video generation completed successfully!");
        Ok(url)
    }
}

#[async_trait]
impl VideoProvider for GeminiClient {
    fn name(&self) -> &str {
        "Google Veo3"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.generate_video(request).await
    }
}
