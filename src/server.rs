//! HTTP surface: liveness, video generation, and the static videos mount.

use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::video::{
    AspectRatio, GenerationRequest, Quality, VideoModel, VideoOrchestrator, VideoStore,
    VIDEOS_URL_PREFIX,
};

/// Detail returned when every provider failed.
pub const GENERATION_FAILED_DETAIL: &str =
    "Failed to generate video with all available providers. Please check your API keys and try again.";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<VideoOrchestrator>,
}

/// Body of `POST /generate_video`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoRequest {
    pub prompt: String,
    pub video_ratio: AspectRatio,
    pub video_quality: Quality,
    #[serde(default)]
    pub video_model: Option<VideoModel>,
}

impl From<VideoRequest> for GenerationRequest {
    fn from(body: VideoRequest) -> Self {
        GenerationRequest::new(
            body.prompt,
            body.video_ratio,
            body.video_quality,
            body.video_model,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub success: bool,
    pub video_url: String,
    pub message: String,
}

/// Errors surfaced to HTTP clients as `{ "detail": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("{}", GENERATION_FAILED_DETAIL)]
    GenerationFailed,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::GenerationFailed | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            ApiError::InvalidBody(rejection) => rejection.body_text(),
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "detail": detail }))).into_response()
    }
}

/// Build the application router.
pub fn create_router(orchestrator: Arc<VideoOrchestrator>, videos_dir: &Path) -> Router {
    let state = AppState { orchestrator };

    Router::new()
        .route("/", get(read_root))
        .route("/generate_video", post(generate_video))
        .nest_service(VIDEOS_URL_PREFIX, ServeDir::new(videos_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn read_root() -> impl IntoResponse {
    Json(json!({ "message": "Text-to-Video API is running!" }))
}

async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<VideoResponse>, ApiError> {
    let Json(body) = payload?;

    let request = GenerationRequest::from(body);
    log::info!(
        "Received video generation request: {}...",
        request.prompt_preview()
    );

    // Run detached so a client hanging up does not abort polling mid-way.
    let orchestrator = Arc::clone(&state.orchestrator);
    let result = tokio::spawn(async move { orchestrator.generate_video(&request).await })
        .await
        .map_err(|e| {
            log::error!("Unexpected error in video generation: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    match result.video_url {
        Some(video_url) => Ok(Json(VideoResponse {
            success: true,
            video_url,
            message: "Video generated successfully".to_string(),
        })),
        None => Err(ApiError::GenerationFailed),
    }
}

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to create videos directory '{path}': {source}", path = .path.display())]
    VideosDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config, orchestrator: Arc<VideoOrchestrator>) -> Result<(), ServerError> {
    let store = VideoStore::new(config.storage.videos_dir.clone());
    store
        .ensure_dir_exists()
        .map_err(|source| ServerError::VideosDir {
            path: store.dir().to_path_buf(),
            source,
        })?;

    let app = create_router(orchestrator, store.dir());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    log::info!("Text-to-Video API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
