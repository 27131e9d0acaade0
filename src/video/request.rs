//! GenerationRequest and the enums accepted by the HTTP API.

use serde::{Deserialize, Serialize};

use super::error::ProviderError;

/// Aspect ratio of the requested video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "3:1")]
    Wide,
    #[serde(rename = "1:3")]
    Tall,
}

impl AspectRatio {
    /// Returns the ratio as the provider expects it (e.g. `"16:9"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Wide => "3:1",
            Self::Tall => "1:3",
        }
    }
}

/// Requested output quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "140")]
    P140,
    #[serde(rename = "360")]
    P360,
    #[serde(rename = "720")]
    P720,
    #[serde(rename = "1080")]
    P1080,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P140 => "140",
            Self::P360 => "360",
            Self::P720 => "720",
            Self::P1080 => "1080",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }

    /// 140/360/720 form the low tier; everything above is high tier.
    pub fn is_low_tier(&self) -> bool {
        matches!(self, Self::P140 | Self::P360 | Self::P720)
    }

    /// Model used when the caller does not pick one.
    pub fn default_model(&self) -> VideoModel {
        if self.is_low_tier() {
            VideoModel::Veo3Fast
        } else {
            VideoModel::Veo3Quality
        }
    }

    /// Output resolution sent to the provider.
    pub fn resolution(&self) -> &'static str {
        if self.is_low_tier() {
            "720p"
        } else {
            "1080p"
        }
    }
}

/// Video model offered by the Veo3Gen provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoModel {
    #[serde(rename = "veo3-fast")]
    Veo3Fast,
    #[serde(rename = "veo3-quality")]
    Veo3Quality,
}

impl VideoModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo3Fast => "veo3-fast",
            Self::Veo3Quality => "veo3-quality",
        }
    }
}

/// A single text-to-video request, built once per HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub quality: Quality,
    pub model: Option<VideoModel>,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        aspect_ratio: AspectRatio,
        quality: Quality,
        model: Option<VideoModel>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio,
            quality,
            model,
        }
    }

    /// The explicit model if one was given, otherwise the quality-derived default.
    pub fn effective_model(&self) -> VideoModel {
        self.model.unwrap_or_else(|| self.quality.default_model())
    }

    /// Resolution derived from the quality tier.
    pub fn resolution(&self) -> &'static str {
        self.quality.resolution()
    }

    /// First 50 characters of the prompt, for log lines.
    pub fn prompt_preview(&self) -> String {
        self.prompt.chars().take(50).collect()
    }
}

/// Validate a prompt before it is sent anywhere.
pub fn validate_prompt(prompt: &str) -> Result<(), ProviderError> {
    if prompt.trim().is_empty() {
        return Err(ProviderError::EmptyPrompt);
    }
    Ok(())
}
