//! Text-to-video generation.
//!
//! Two providers sit behind the `VideoProvider` trait: Veo3Gen, an
//! asynchronous job API that is submitted to and polled, and Gemini, a single
//! synchronous call whose inline video is written to a local directory. The
//! orchestrator tries them in that order and reports only whether a URL came
//! back.

mod clock;
mod error;
mod gemini;
mod orchestrator;
mod provider;
mod request;
mod storage;
mod veo3gen;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ProviderError;
pub use gemini::GeminiClient;
pub use orchestrator::{GenerationResult, VideoOrchestrator};
pub use provider::VideoProvider;
pub use request::{validate_prompt, AspectRatio, GenerationRequest, Quality, VideoModel};
pub use storage::{VideoStore, VIDEOS_URL_PREFIX};
pub use veo3gen::{JobStatus, Veo3GenClient, Veo3GenJob};
