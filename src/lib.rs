//! text-to-video library crate.
//!
//! Exposes the configuration, providers, orchestrator and HTTP router so the
//! binary and the integration tests share one implementation.

pub mod cli;
pub mod config;
pub mod server;
pub mod video;
