use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stay_scout::config::load_config;
use stay_scout::driver::HtmlDocument;
use stay_scout::scenario;
use stay_scout::scrapers::listings::{extract_all, find_cards};
use stay_scout::scrapers::rooms::{extract_rooms, RoomTableOptions};
use stay_scout::sink::FsSink;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stay-scout")]
#[command(about = "Search a hotel booking site and extract listings and room prices")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full search scenario in Chrome (default)
    Run {
        /// Destination typed into the search box
        #[arg(long)]
        destination: Option<String>,
        /// Keyword an autocomplete suggestion must contain
        #[arg(long)]
        keyword: Option<String>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
        /// Directory for screenshots and results.json
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Extract listing cards from a saved results page
    Listings { file: PathBuf },
    /// Extract the room table from a saved property page
    Rooms {
        file: PathBuf,
        /// Currency glyph marking prices; defaults to the configured one
        #[arg(long)]
        currency: Option<String>,
    },
}

async fn load_snapshot(path: &Path) -> Result<HtmlDocument> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(HtmlDocument::new(&html).with_url(format!("file://{}", path.display())))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config()?;

    match cli.command.unwrap_or(Commands::Run {
        destination: None,
        keyword: None,
        headful: false,
        output_dir: None,
    }) {
        Commands::Run {
            destination,
            keyword,
            headful,
            output_dir,
        } => {
            if let Some(destination) = destination {
                config.destination = destination;
            }
            if let Some(keyword) = keyword {
                config.destination_keyword = keyword.to_lowercase();
            }
            if headful {
                config.headless = false;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            info!("🏨 Stay Scout");
            info!("==========================================");
            info!(
                "Searching {} for {} nights, {} days from today",
                config.destination, config.stay_nights, config.check_in_offset_days
            );

            let sink = FsSink::new(config.output_dir.clone());
            let summary = scenario::run(&config, &sink).await?;

            info!(
                "✅ Done: {} listings, {} rooms",
                summary.search.listings.len(),
                summary.detail.rooms.len()
            );
        }
        Commands::Listings { file } => {
            let doc = load_snapshot(&file).await?;
            let cards = find_cards(&doc);
            let listings = extract_all(&doc, &cards);
            println!("{}", serde_json::to_string_pretty(&listings)?);
        }
        Commands::Rooms { file, currency } => {
            let doc = load_snapshot(&file).await?;
            let options = RoomTableOptions {
                currency: currency.unwrap_or(config.currency),
                ..RoomTableOptions::default()
            };
            let rooms = extract_rooms(&doc, &options);
            println!("{}", serde_json::to_string_pretty(&rooms)?);
        }
    }

    Ok(())
}
