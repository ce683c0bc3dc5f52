use async_trait::async_trait;
use tokio::sync::RwLock;
use wn_core::{NewsItem, NewsStorage, Result};

/// In-memory storage for tests and dry runs. Ids are 1-based insertion
/// indices, so ordering semantics match the SQLite backend.
pub struct MemoryStorage {
    items: RwLock<Vec<NewsItem>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsStorage for MemoryStorage {
    async fn store_item(&self, item: &NewsItem) -> Result<i64> {
        let mut items = self.items.write().await;
        items.push(item.clone());
        Ok(items.len() as i64)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let items = self.items.read().await;
        Ok(items.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wn_core::models::parse_absolute_url;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            category: String::new(),
            reactions_info: String::new(),
            reactions_link: None,
            reactions: Vec::new(),
            article_link: parse_absolute_url("https://www.waldnet.nl/nieuws/1").unwrap(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_memory_storage_latest_is_reverse_insertion_order() {
        let storage = MemoryStorage::new();
        for title in ["a", "b", "c"] {
            storage.store_item(&item(title)).await.unwrap();
        }

        let latest = storage.latest(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].title, "c");
        assert_eq!(latest[1].title, "b");
    }

    #[tokio::test]
    async fn test_memory_storage_assigns_sequential_ids() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.store_item(&item("a")).await.unwrap(), 1);
        assert_eq!(storage.store_item(&item("b")).await.unwrap(), 2);
    }
}
