use async_trait::async_trait;

use crate::models::NewsItem;
use crate::Result;

#[async_trait]
pub trait NewsStorage: Send + Sync {
    /// Persist one news item with its reactions and nested reactions as a
    /// single unit; returns the assigned item id. A failure leaves no partial
    /// rows behind.
    async fn store_item(&self, item: &NewsItem) -> Result<i64>;

    /// Up to `limit` items, most recently stored first, each fully
    /// reassembled with its ordered reactions and nested reactions.
    async fn latest(&self, limit: usize) -> Result<Vec<NewsItem>>;
}
