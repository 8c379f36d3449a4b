//! Guide Control - command-line interface for the local guide.
//!
//! Embeds the core directly; run without a subcommand for the interactive
//! prompt.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guide_core::{BudgetLevel, GuideConfig, GuideSystem, RecommendationKind, TranslationDirection};
use guidectl::{commands, repl};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "guidectl")]
#[command(about = "Local guide - culture, food, transport, slang and safety", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = guide_core::config::CONFIG_PATH)]
    config: String,

    /// Subcommand (if not provided, starts the interactive prompt)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question
    Ask {
        /// The question, as free text
        query: Vec<String>,
    },

    /// Translate slang to or from standard language
    Translate {
        /// Text to translate
        text: Vec<String>,

        /// to_standard, to_local, or mixed
        #[arg(long, default_value = "to_standard")]
        direction: TranslationDirection,
    },

    /// Ranked suggestions: food, transport, activity, or safety
    Recommend {
        kind: RecommendationKind,

        /// Area name to match against known locations
        #[arg(long)]
        location: Option<String>,

        /// low, medium, or high
        #[arg(long)]
        budget: Option<BudgetLevel>,

        /// Current weather, e.g. "rain" or "hot"
        #[arg(long)]
        weather: Option<String>,

        /// Ongoing festival name, adjusts every suggestion
        #[arg(long)]
        festival: Option<String>,
    },

    /// Show how a query is processed, stage by stage
    Debug {
        query: Vec<String>,
    },

    /// Show what the guide currently knows
    Status,

    /// Scripted walkthrough of sample queries
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = GuideConfig::load(&cli.config)?;
    let guide = GuideSystem::new(config).context("knowledge source initialization failed")?;

    match cli.command {
        Some(Commands::Ask { query }) => commands::ask(&guide, &query.join(" ")),
        Some(Commands::Translate { text, direction }) => {
            commands::translate(&guide, &text.join(" "), direction)
        }
        Some(Commands::Recommend {
            kind,
            location,
            budget,
            weather,
            festival,
        }) => commands::recommend(&guide, kind, location, budget, weather, festival),
        Some(Commands::Debug { query }) => commands::debug(&guide, &query.join(" ")),
        Some(Commands::Status) => commands::status(&guide),
        Some(Commands::Demo) => commands::demo(&guide),
        None => repl::run(&guide),
    }
}
