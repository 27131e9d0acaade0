//! Configuration file handling for text-to-video.
//!
//! Loads configuration from `~/.config/text-to-video/config.toml` or a custom
//! path, then applies API keys from the environment. The result is built once
//! at startup and handed to each provider client by reference.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Veo3Gen bearer token.
pub const VEO3_GEN_API_KEY_ENV: &str = "VEO3_GEN_API_KEY";

/// Environment variable holding the Google Generative Language API key.
pub const GOOGLE_VEO3_API_KEY_ENV: &str = "GOOGLE_VEO3_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub veo3gen: Veo3GenConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Where generated artifacts are staged and served from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub videos_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from("videos"),
        }
    }
}

/// Settings for the asynchronous Veo3Gen job API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Veo3GenConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
    /// Ceiling on the whole polling loop.
    pub max_wait_secs: u64,
    /// Fixed delay between status checks.
    pub poll_interval_secs: u64,
    /// Clip length requested from the provider.
    pub duration_secs: u32,
}

impl Default for Veo3GenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.veo3gen.app".to_string(),
            api_key: None,
            request_timeout_secs: 30,
            max_wait_secs: 300,
            poll_interval_secs: 10,
            duration_secs: 5,
        }
    }
}

/// Settings for the synchronous Gemini `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.4,
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from a file path, then apply environment overrides.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default = default_path();
                if default.exists() {
                    Self::load_from_file(&default)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a TOML file. Missing sections fall back to defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Fill API keys from the environment. Set variables win over the file;
    /// empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(VEO3_GEN_API_KEY_ENV) {
            self.veo3gen.api_key = Some(key);
        }
        if let Some(key) = non_empty(GOOGLE_VEO3_API_KEY_ENV) {
            self.gemini.api_key = Some(key);
        }
    }

    /// Copy with API keys masked, for printing.
    pub fn redacted(&self) -> Self {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.veo3gen.api_key = mask(&self.veo3gen.api_key);
        copy.gemini.api_key = mask(&self.gemini.api_key);
        copy
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}", path = .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}", path = .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("text-to-video").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("text-to-video.toml"))
}
