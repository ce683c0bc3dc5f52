use std::sync::Arc;

use tracing::{error, info};
use wn_core::{NewsStorage, Result};

pub(crate) mod blocks;
pub mod waldnet;

pub use waldnet::{ScraperConfig, WaldnetScraper};

/// Extract-with-default helpers shared by the extraction code. Every optional
/// element lookup goes through these so the fallback rule lives in one place:
/// a missing element yields the default, never an error.
pub(crate) mod utils {
    use scraper::{ElementRef, Selector};

    pub fn element_text(el: ElementRef<'_>) -> String {
        el.text().collect::<String>().trim().to_string()
    }

    pub fn text_or(scope: ElementRef<'_>, selector: &Selector, default: &str) -> String {
        scope
            .select(selector)
            .next()
            .map(element_text)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn attr_of(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
        scope
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.to_string())
    }
}

/// Outcome of one scrape-and-store pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub scraped: usize,
    pub stored: usize,
    pub failed: usize,
}

pub struct ScraperManager {
    storage: Arc<dyn NewsStorage>,
    scraper: WaldnetScraper,
}

impl ScraperManager {
    pub fn new(storage: Arc<dyn NewsStorage>, scraper: WaldnetScraper) -> Self {
        Self { storage, scraper }
    }

    /// Scrape one pass and store every extracted item. A failed store is
    /// logged and counted; the rest of the batch still goes through.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let items = self.scraper.scrape_news().await?;
        let mut summary = RunSummary {
            scraped: items.len(),
            stored: 0,
            failed: 0,
        };

        for item in &items {
            match self.storage.store_item(item).await {
                Ok(id) => {
                    info!("💾 stored '{}' as news item {}", item.title, id);
                    summary.stored += 1;
                }
                Err(e) => {
                    error!("failed to store '{}': {}", item.title, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
