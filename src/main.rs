use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use text_to_video::cli::{Args, Command, ConfigAction};
use text_to_video::config::{self, Config};
use text_to_video::server;
use text_to_video::video::VideoOrchestrator;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    // Load .env first so RUST_LOG and the API keys are visible.
    // Existing variables are not overridden; a missing .env is fine.
    let _ = dotenv::dotenv();
    init_logging();

    let args = Args::parse();

    let mut cfg = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    args.apply_overrides(&mut cfg);

    match args.command {
        Some(Command::Config { action }) => {
            if let Err(e) = handle_config_action(action, &cfg) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Command::Serve) | None => {
            if let Err(e) = run_server(cfg) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn handle_config_action(action: ConfigAction, cfg: &Config) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            let rendered = cfg.redacted().to_toml().map_err(|e| e.to_string())?;
            println!("{}", rendered);
        }
        ConfigAction::Path => {
            println!("{}", config::default_path().display());
        }
    }
    Ok(())
}

fn run_server(cfg: Config) -> Result<(), String> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(async {
        let orchestrator = Arc::new(VideoOrchestrator::from_config(&cfg));
        log::info!(
            "Providers in fallback order: {:?}",
            orchestrator.provider_names()
        );

        server::serve(&cfg, orchestrator)
            .await
            .map_err(|e| e.to_string())
    })
}
