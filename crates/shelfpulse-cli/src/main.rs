mod analyze;
mod probe;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfpulse-cli")]
#[command(about = "Product review discovery and sentiment analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover products for a category, analyze their reviews and export CSV
    Analyze {
        /// Product category to search for (e.g. "cookies")
        category: String,

        /// Maximum number of products to analyze (1-20)
        #[arg(long, default_value_t = 5)]
        max_products: usize,

        /// Maximum number of reviews per product (1-50)
        #[arg(long, default_value_t = 10)]
        max_reviews: usize,

        /// Directory for CSV exports; defaults to `SHELFPULSE_EXPORT_DIR`
        #[arg(long)]
        out: Option<PathBuf>,

        /// Exclude products with no real reviews instead of synthesizing samples
        #[arg(long)]
        no_synthetic: bool,
    },
    /// Check which retail site pages are reachable from this host
    Probe {
        /// Category used to build the search URLs
        #[arg(default_value = "cookies")]
        category: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = shelfpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze {
            category,
            max_products,
            max_reviews,
            out,
            no_synthetic,
        }) => {
            if let Some(dir) = out {
                config.export_dir = dir;
            }
            if no_synthetic {
                config.allow_synthetic_reviews = false;
            }
            analyze::run_analyze(&config, &category, max_products, max_reviews).await?;
        }
        Some(Commands::Probe { category }) => probe::run_probe(&config, &category).await?,
        None => println!("no command given; try `shelfpulse-cli analyze cookies`"),
    }

    Ok(())
}
