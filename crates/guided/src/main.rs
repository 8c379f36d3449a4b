//! Guide Daemon - serves the local guide core over HTTP.
//!
//! Owns process lifetime and per-session history; all decision logic lives
//! in guide_core.

use anyhow::{Context, Result};
use clap::Parser;
use guide_core::{GuideConfig, GuideSystem};
use guided::server::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "guided")]
#[command(about = "Local guide daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = guide_core::config::CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("guided v{} starting", env!("CARGO_PKG_VERSION"));

    let config = GuideConfig::load(&cli.config)?;
    let bind_addr = config.bind_addr.clone();

    let guide = GuideSystem::new(config).context("knowledge source initialization failed")?;
    let status = guide.status();
    info!(
        "Knowledge ready: city {:?}, {} sections, {} slang terms",
        status.city, status.sections_loaded, status.slang_terms
    );

    server::run(AppState::new(guide), &bind_addr).await
}
