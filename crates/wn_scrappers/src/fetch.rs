use async_trait::async_trait;
use wn_core::{Error, Result};

/// Retrieval seam: callers hand over a URL and get raw HTML text back.
/// Request construction, headers and blocking countermeasures live behind
/// this trait, never in extraction code.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

// waldnet.nl serves a captcha page to clients without a browser UA.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Scraping(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}
