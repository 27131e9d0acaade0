//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// HTTP service that turns text prompts into videos
#[derive(Parser, Debug)]
#[command(name = "text-to-video")]
#[command(version, about = "Text-to-video HTTP API with provider fallback", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Directory generated videos are written to and served from
    #[arg(long)]
    pub videos_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration with API keys masked
    Show,
    /// Print the default config file path
    Path,
}

impl Args {
    /// Apply CLI overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref dir) = self.videos_dir {
            config.storage.videos_dir = dir.clone();
        }
    }
}
