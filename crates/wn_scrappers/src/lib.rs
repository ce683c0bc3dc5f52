pub mod fetch;
pub mod scrapers;

pub use fetch::{HttpFetcher, PageFetcher};
pub use scrapers::{RunSummary, ScraperManager};
pub use scrapers::waldnet::{ScraperConfig, WaldnetScraper};

pub mod prelude {
    pub use super::fetch::PageFetcher;
    pub use wn_core::{Error, NewsItem, Result};
}
