//! Veo3GenClient - submits jobs to the Veo3Gen queue and polls them to completion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::error::ProviderError;
use super::provider::VideoProvider;
use super::request::{validate_prompt, GenerationRequest};
use crate::config::Veo3GenConfig;

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `errorType` the provider uses when the account is out of credits.
const INSUFFICIENT_CREDITS: &str = "INSUFFICIENT_CREDITS";

/// Request body for `POST /api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    audio: bool,
    options: GenerateOptions<'a>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions<'a> {
    resolution: &'a str,
    aspect_ratio: &'a str,
    duration: u32,
}

/// Response from job submission.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default, rename = "taskId")]
    task_id: Option<String>,
}

/// Response from `GET /api/status/{task_id}`.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<StatusResult>,
    /// Either a bare string or `{ "message": ... }`.
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    #[serde(default, rename = "videoUrl")]
    video_url: Option<String>,
}

/// Error body returned with non-success responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    required: Option<Value>,
    #[serde(default)]
    available: Option<Value>,
}

/// Lifecycle of a Veo3Gen task as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Map the provider's status string. Anything unrecognized is treated as
    /// still running so the loop keeps polling.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "queued" | "pending" => JobStatus::Queued,
            _ => JobStatus::Processing,
        }
    }
}

/// Snapshot of a task observed through one status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veo3GenJob {
    pub task_id: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

/// Pull a human-readable message out of a string-or-object error field.
fn error_message(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn value_or_unknown(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Turn a non-success response body into a `ProviderError`.
fn parse_error(status: u16, text: &str) -> ProviderError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

    if body.error_type.as_deref() == Some(INSUFFICIENT_CREDITS) {
        return ProviderError::InsufficientCredits {
            required: value_or_unknown(body.required.as_ref()),
            available: value_or_unknown(body.available.as_ref()),
        };
    }

    let message = error_message(body.error.as_ref()).unwrap_or_else(|| {
        if text.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            text.to_string()
        }
    });
    ProviderError::ApiError { status, message }
}

/// Client for the Veo3Gen asynchronous job API.
pub struct Veo3GenClient {
    api_key: String,
    base_url: String,
    max_wait: Duration,
    poll_interval: Duration,
    duration_secs: u32,
    http_client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl Veo3GenClient {
    /// Create a client from configuration, polling on the wall clock.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingApiKey` if no bearer token is configured,
    /// or `ProviderError::InvalidConfig` if the poll interval is zero.
    pub fn from_config(config: &Veo3GenConfig) -> Result<Self, ProviderError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client with an explicit time source.
    pub fn with_clock(config: &Veo3GenConfig, clock: Arc<dyn Clock>) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        // Zero would turn the wait into a tight loop against the status endpoint.
        if config.poll_interval_secs == 0 {
            return Err(ProviderError::InvalidConfig(
                "veo3gen.poll_interval_secs must be at least 1".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_wait: Duration::from_secs(config.max_wait_secs),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            duration_secs: config.duration_secs,
            http_client,
            clock,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Submit a generation job and return its task ID.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InsufficientCredits` or `ProviderError::ApiError`
    /// if the provider rejects the job, `ProviderError::MissingTaskId` if it
    /// accepts it without an ID, or `ProviderError::HttpError` on transport
    /// failure.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        validate_prompt(&request.prompt)?;

        let model = request.effective_model();
        let body = GenerateRequest {
            model: model.as_str(),
            prompt: &request.prompt,
            audio: true,
            options: GenerateOptions {
                resolution: request.resolution(),
                aspect_ratio: request.aspect_ratio.as_str(),
                duration: self.duration_secs,
            },
        };

        log::info!("Starting VEO3 video generation...");
        log::info!("Prompt: {}...", request.prompt_preview());
        log::info!("Model: {}, Resolution: {}", body.model, body.options.resolution);

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let error = parse_error(status, &text);
            log::error!("VEO3 generation request failed: {}", error);
            return Err(error);
        }

        let submitted: SubmitResponse = response.json().await?;
        let task_id = submitted
            .task_id
            .filter(|id| !id.is_empty())
            .ok_or(ProviderError::MissingTaskId)?;

        log::info!("VEO3 generation started with task ID: {}", task_id);
        Ok(task_id)
    }

    /// Read the current state of a task once.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::HttpError` if the request fails or the body is
    /// not JSON, or `ProviderError::ApiError` on a non-success status.
    pub async fn poll_status(&self, task_id: &str) -> Result<Veo3GenJob, ProviderError> {
        let url = format!("{}/api/status/{}", self.base_url, task_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status, &text));
        }

        let body: StatusResponse = response.json().await?;
        let raw_status = body.status.unwrap_or_default();
        log::info!("VEO3 status: {}", raw_status);

        Ok(Veo3GenJob {
            task_id: task_id.to_string(),
            status: JobStatus::parse(&raw_status),
            result_url: body.result.and_then(|r| r.video_url),
            error: error_message(body.error.as_ref()),
        })
    }

    /// Poll a task at a fixed interval until it finishes or the ceiling passes.
    ///
    /// A single failed status read ends the wait; it is not retried.
    pub async fn wait_for_completion(&self, task_id: &str) -> Result<String, ProviderError> {
        let start = self.clock.now();
        log::info!("Polling VEO3 status for task: {}", task_id);

        while self.clock.now().duration_since(start) < self.max_wait {
            let job = match self.poll_status(task_id).await {
                Ok(job) => job,
                Err(e) => {
                    log::error!("Error while polling VEO3 status: {}", e);
                    return Err(e);
                }
            };

            match job.status {
                JobStatus::Completed => {
                    log::info!("VEO3 video generation completed successfully!");
                    return job
                        .result_url
                        .filter(|url| !url.is_empty())
                        .ok_or_else(|| {
                            log::error!("No video URL in completed response");
                            ProviderError::MissingVideoUrl
                        });
                }
                JobStatus::Failed => {
                    let message = job.error.unwrap_or_else(|| "Unknown error".to_string());
                    log::error!("VEO3 video generation failed: {}", message);
                    return Err(ProviderError::GenerationFailed { message });
                }
                JobStatus::Queued | JobStatus::Processing => {
                    log::info!(
                        "VEO3 video still processing, waiting {:?}...",
                        self.poll_interval
                    );
                    self.clock.sleep(self.poll_interval).await;
                }
            }
        }

        log::error!("VEO3 video generation timed out");
        Err(ProviderError::Timeout {
            waited_secs: self.max_wait.as_secs(),
        })
    }

    /// Submit a job and wait for its video URL.
    pub async fn submit_and_wait(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let task_id = self.submit(request).await?;
        self.wait_for_completion(&task_id).await
    }
}

#[async_trait]
impl VideoProvider for Veo3GenClient {
    fn name(&self) -> &str {
        "Veo3 Gen"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.submit_and_wait(request).await
    }
}
