//! Fallback behaviour across both real providers, each backed by a mock server.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use text_to_video::config::Config;
use text_to_video::video::{
    AspectRatio, GenerationRequest, ManualClock, Quality, VideoOrchestrator,
};

const GEMINI_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

struct Harness {
    veo3gen: MockServer,
    gemini: MockServer,
    videos: TempDir,
    clock: Arc<ManualClock>,
}

impl Harness {
    async fn start() -> Self {
        Self {
            veo3gen: MockServer::start().await,
            gemini: MockServer::start().await,
            videos: TempDir::new().unwrap(),
            clock: Arc::new(ManualClock::new()),
        }
    }

    fn config(&self, veo3gen_key: Option<&str>, gemini_key: Option<&str>) -> Config {
        let mut config = Config::default();
        config.storage.videos_dir = self.videos.path().to_path_buf();
        config.veo3gen.base_url = self.veo3gen.uri();
        config.veo3gen.api_key = veo3gen_key.map(str::to_string);
        config.gemini.base_url = self.gemini.uri();
        config.gemini.api_key = gemini_key.map(str::to_string);
        config
    }

    fn orchestrator(&self, veo3gen_key: Option<&str>, gemini_key: Option<&str>) -> VideoOrchestrator {
        VideoOrchestrator::from_config_with_clock(
            &self.config(veo3gen_key, gemini_key),
            self.clock.clone(),
        )
    }

    async fn gemini_returns_video(&self, expected_calls: u64) {
        let data = base64::engine::general_purpose::STANDARD.encode(b"fallback clip");
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "inlineData": { "mimeType": "video/mp4", "data": data } }]
                    }
                }]
            })))
            .expect(expected_calls)
            .mount(&self.gemini)
            .await;
    }

    async fn veo3gen_accepts(&self, task_id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "taskId": task_id })))
            .expect(1)
            .mount(&self.veo3gen)
            .await;
    }
}

fn request() -> GenerationRequest {
    GenerationRequest::new("waves at dusk", AspectRatio::Portrait, Quality::P1080, None)
}

#[tokio::test]
async fn test_missing_veo3gen_key_goes_straight_to_gemini() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.veo3gen)
        .await;
    harness.gemini_returns_video(1).await;

    let orchestrator = harness.orchestrator(None, Some("google-key"));
    let result = orchestrator.generate_video(&request()).await;

    let url = result.video_url.expect("gemini should succeed");
    let filename = url.strip_prefix("/videos/").unwrap();
    assert!(harness.videos.path().join(filename).exists());
}

#[tokio::test]
async fn test_veo3gen_success_never_calls_gemini() {
    let harness = Harness::start().await;
    harness.veo3gen_accepts("task-ok").await;

    Mock::given(method("GET"))
        .and(path("/api/status/task-ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result": { "videoUrl": "https://cdn.example.com/ok.mp4" }
        })))
        .mount(&harness.veo3gen)
        .await;
    harness.gemini_returns_video(0).await;

    let orchestrator = harness.orchestrator(Some("veo-key"), Some("google-key"));
    let result = orchestrator.generate_video(&request()).await;

    assert_eq!(
        result.video_url.as_deref(),
        Some("https://cdn.example.com/ok.mp4")
    );
}

#[tokio::test]
async fn test_veo3gen_timeout_falls_back_to_gemini() {
    let harness = Harness::start().await;
    harness.veo3gen_accepts("task-slow").await;

    Mock::given(method("GET"))
        .and(path("/api/status/task-slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processing" })))
        .expect(30)
        .mount(&harness.veo3gen)
        .await;
    harness.gemini_returns_video(1).await;

    let orchestrator = harness.orchestrator(Some("veo-key"), Some("google-key"));
    let result = orchestrator.generate_video(&request()).await;

    assert!(result.video_url.unwrap().starts_with("/videos/veo3_video_"));
    assert_eq!(harness.clock.elapsed(), Duration::from_secs(300));
}

#[tokio::test]
async fn test_veo3gen_failed_job_falls_back_to_gemini() {
    let harness = Harness::start().await;
    harness.veo3gen_accepts("task-bad").await;

    Mock::given(method("GET"))
        .and(path("/api/status/task-bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": { "message": "unsafe prompt" }
        })))
        .expect(1)
        .mount(&harness.veo3gen)
        .await;
    harness.gemini_returns_video(1).await;

    let orchestrator = harness.orchestrator(Some("veo-key"), Some("google-key"));
    let result = orchestrator.generate_video(&request()).await;

    assert!(result.is_success());
}

#[tokio::test]
async fn test_both_providers_failing_yields_no_url() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid API key" })))
        .expect(1)
        .mount(&harness.veo3gen)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&harness.gemini)
        .await;

    let orchestrator = harness.orchestrator(Some("veo-key"), Some("google-key"));
    let result = orchestrator.generate_video(&request()).await;

    assert!(result.video_url.is_none());
    assert_eq!(std::fs::read_dir(harness.videos.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_no_keys_configured_yields_no_url_without_network() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.veo3gen)
        .await;
    harness.gemini_returns_video(0).await;

    let orchestrator = harness.orchestrator(None, None);
    assert!(orchestrator.provider_names().is_empty());

    let result = orchestrator.generate_video(&request()).await;
    assert!(!result.is_success());
}
