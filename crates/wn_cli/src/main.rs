use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use wn_core::{NewsStorage, Result};
use wn_scrappers::{HttpFetcher, ScraperConfig, ScraperManager, WaldnetScraper};
use wn_storage::SqliteStorage;

#[derive(Parser, Debug)]
#[command(author, version, about = "WaldNet news and reactions scraper", long_about = None)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, default_value = "waldnet.db")]
    db: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scrape the front page and store the extracted items
    Scrape {
        /// Cap on front-page items processed per run
        #[arg(long, default_value_t = 10)]
        max_items: usize,
        /// Pause between reactions-page fetches, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
        /// Keep running, waiting this many seconds between passes
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the most recently stored items
    Latest {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

async fn run_pass(manager: &ScraperManager) {
    match manager.run_once().await {
        Ok(summary) => info!(
            "🦗 pass done: {} scraped, {} stored, {} failed",
            summary.scraped, summary.stored, summary.failed
        ),
        Err(e) => error!("scrape pass failed: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let storage = Arc::new(SqliteStorage::new_with_path(&cli.db).await?);
    info!("🏦 storage ready at {}", storage.db_path().display());

    match cli.command {
        Commands::Scrape {
            max_items,
            delay_ms,
            interval,
        } => {
            let config = ScraperConfig {
                max_items,
                request_delay: Duration::from_millis(delay_ms),
            };
            let fetcher = Arc::new(HttpFetcher::new()?);
            let scraper = WaldnetScraper::with_config(fetcher, config);
            let manager = ScraperManager::new(storage, scraper);

            match interval {
                Some(secs) => loop {
                    run_pass(&manager).await;
                    info!("waiting {}s before next pass", secs);
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                },
                None => run_pass(&manager).await,
            }
        }
        Commands::Latest { limit, json } => {
            let items = storage.latest(limit).await?;
            if json {
                let out = serde_json::to_string_pretty(&items)
                    .map_err(|e| wn_core::Error::External(e.into()))?;
                println!("{}", out);
            } else {
                for item in &items {
                    println!("{} [{}] - {}", item.title, item.category, item.article_link);
                    for reaction in &item.reactions {
                        println!(
                            "  {} ({}, {} likes): {}",
                            reaction.user, reaction.language, reaction.likes, reaction.text
                        );
                        for nested in &reaction.nested_reactions {
                            println!("    > ({}) {}", nested.language, nested.text);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
