//! Error type shared by the video providers.

/// Errors that can occur while a provider generates a video.
///
/// The orchestrator never lets these reach the HTTP layer; they are logged
/// and folded into an absent result.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status returned by the provider
        status: u16,
        /// Provider-supplied error text, or the raw body
        message: String,
    },

    #[error("Insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: String, available: String },

    #[error("No task ID returned from generation request")]
    MissingTaskId,

    #[error("Generation completed but no video URL in response")]
    MissingVideoUrl,

    #[error("Generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Generation timed out after {waited_secs}s")]
    Timeout { waited_secs: u64 },

    #[error("Prompt blocked: {reason}")]
    ContentBlocked { reason: String },

    #[error("No video part found in response")]
    NoVideoPart,

    #[error("Video part carried no data")]
    EmptyVideoData,

    #[error("Failed to decode video payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty prompt")]
    EmptyPrompt,
}

impl ProviderError {
    /// Whether the error came from local settings rather than the provider itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProviderError::MissingApiKey | ProviderError::InvalidConfig(_)
        )
    }
}
