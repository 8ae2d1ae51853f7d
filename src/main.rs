use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

/// mealpick - allergy-safe recipe recommendations
#[derive(Parser)]
#[command(name = "mealpick")]
#[command(about = "Allergy-safe recipe selection and meal plan filling", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Recommend recipes for one meal slot
    Recommend(cli::RecommendArgs),
    /// Fill a multi-day meal plan
    Plan(cli::PlanArgs),
    /// Resolve allergen names to catalog ids
    Allergens {
        /// Allergen names, case-insensitive
        #[arg(required = true)]
        names: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = mealpick::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    mealpick::observability::init_observability(
        "mealpick",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Migrate => cli::migrate(config).await,
        Commands::Recommend(args) => cli::recommend(config, args).await,
        Commands::Plan(args) => cli::plan(config, args).await,
        Commands::Allergens { names, json } => cli::resolve(config, names, json).await,
    }
}
