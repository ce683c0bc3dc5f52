use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;
use url::Url;
use wn_core::models::parse_absolute_url;
use wn_core::{Error, Image, Language, NestedReaction, NewsItem, NewsStorage, Reaction, Result};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        category TEXT,
        reactions_info TEXT,
        reactions_link TEXT,
        article_link TEXT NOT NULL,
        image_url TEXT,
        image_alt TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        news_item_id INTEGER,
        user TEXT,
        text TEXT,
        language TEXT,
        likes TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (news_item_id) REFERENCES news_items (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nested_reactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reaction_id INTEGER,
        text TEXT,
        language TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (reaction_id) REFERENCES reactions (id)
    )
    "#,
    // Add future migrations here
];

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Open the database (creating the file if needed) and run the schema
    /// migrations. The DDL is `IF NOT EXISTS` throughout, so calling this on
    /// every startup is safe; a failure here means there is no usable store.
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            Error::Storage(format!("failed to open {}: {}", db_path.display(), e))
        })?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Batch-load the reactions (with their nested reactions) for a set of
    /// news item ids, grouped by owning item. Reading back in id order
    /// reproduces insertion order, which is the original document order.
    async fn load_reactions(&self, item_ids: &[i64]) -> Result<HashMap<i64, Vec<Reaction>>> {
        let mut by_item: HashMap<i64, Vec<Reaction>> = HashMap::new();
        if item_ids.is_empty() {
            return Ok(by_item);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, news_item_id, user, text, language, likes FROM reactions WHERE news_item_id IN (",
        );
        {
            let mut ids = query.separated(", ");
            for id in item_ids {
                ids.push_bind(*id);
            }
        }
        query.push(") ORDER BY id");

        let reaction_rows = query
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to query reactions: {}", e)))?;

        let reaction_ids: Vec<i64> = reaction_rows.iter().map(|row| row.get("id")).collect();
        let mut nested_by_reaction = self.load_nested(&reaction_ids).await?;

        for row in reaction_rows {
            let reaction_id: i64 = row.get("id");
            let news_item_id: i64 = row.get("news_item_id");
            by_item.entry(news_item_id).or_default().push(Reaction {
                user: row
                    .get::<Option<String>, _>("user")
                    .unwrap_or_else(|| "Unknown".to_string()),
                text: row.get::<Option<String>, _>("text").unwrap_or_default(),
                language: Language::from_tag(
                    &row.get::<Option<String>, _>("language").unwrap_or_default(),
                ),
                likes: row
                    .get::<Option<String>, _>("likes")
                    .unwrap_or_else(|| "0".to_string()),
                nested_reactions: nested_by_reaction.remove(&reaction_id).unwrap_or_default(),
            });
        }
        Ok(by_item)
    }

    async fn load_nested(
        &self,
        reaction_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<NestedReaction>>> {
        let mut by_reaction: HashMap<i64, Vec<NestedReaction>> = HashMap::new();
        if reaction_ids.is_empty() {
            return Ok(by_reaction);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT reaction_id, text, language FROM nested_reactions WHERE reaction_id IN (",
        );
        {
            let mut ids = query.separated(", ");
            for id in reaction_ids {
                ids.push_bind(*id);
            }
        }
        query.push(") ORDER BY id");

        let rows = query
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to query nested reactions: {}", e)))?;

        for row in rows {
            let reaction_id: i64 = row.get("reaction_id");
            by_reaction.entry(reaction_id).or_default().push(NestedReaction {
                text: row.get::<Option<String>, _>("text").unwrap_or_default(),
                language: Language::from_tag(
                    &row.get::<Option<String>, _>("language").unwrap_or_default(),
                ),
            });
        }
        Ok(by_reaction)
    }
}

#[async_trait]
impl NewsStorage for SqliteStorage {
    async fn store_item(&self, item: &NewsItem) -> Result<i64> {
        debug!("storing news item '{}'", item.title);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Storage(format!("failed to begin transaction: {}", e)))?;

        let news_item_id = sqlx::query(
            r#"
            INSERT INTO news_items (title, category, reactions_info, reactions_link,
                                    article_link, image_url, image_alt)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.title)
        .bind(&item.category)
        .bind(&item.reactions_info)
        .bind(item.reactions_link.as_ref().map(Url::as_str))
        .bind(item.article_link.as_str())
        .bind(item.image.as_ref().map(|image| image.url.as_str()))
        .bind(item.image.as_ref().map(|image| image.alt.as_str()))
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Storage(format!("failed to insert news item: {}", e)))?
        .last_insert_rowid();

        for reaction in &item.reactions {
            let reaction_id = sqlx::query(
                "INSERT INTO reactions (news_item_id, user, text, language, likes) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(news_item_id)
            .bind(&reaction.user)
            .bind(&reaction.text)
            .bind(reaction.language.as_str())
            .bind(&reaction.likes)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Storage(format!("failed to insert reaction: {}", e)))?
            .last_insert_rowid();

            for nested in &reaction.nested_reactions {
                sqlx::query(
                    "INSERT INTO nested_reactions (reaction_id, text, language) VALUES (?, ?, ?)",
                )
                .bind(reaction_id)
                .bind(&nested.text)
                .bind(nested.language.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    Error::Storage(format!("failed to insert nested reaction: {}", e))
                })?;
            }
        }

        // Bailing out anywhere above drops the transaction and rolls the
        // whole item back; no partial rows survive a failed store.
        tx.commit()
            .await
            .map_err(|e| Error::Storage(format!("failed to commit news item: {}", e)))?;
        Ok(news_item_id)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<NewsItem>> {
        // created_at has one-second resolution; the id tiebreak keeps
        // "most recently stored first" exact within a second.
        let item_rows = sqlx::query(
            r#"
            SELECT id, title, category, reactions_info, reactions_link,
                   article_link, image_url, image_alt
            FROM news_items
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("failed to query news items: {}", e)))?;

        let item_ids: Vec<i64> = item_rows.iter().map(|row| row.get("id")).collect();
        let mut reactions_by_item = self.load_reactions(&item_ids).await?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            let id: i64 = row.get("id");
            let reactions_link = row
                .get::<Option<String>, _>("reactions_link")
                .map(|link| parse_absolute_url(&link))
                .transpose()?;
            let image = match row.get::<Option<String>, _>("image_url") {
                Some(image_url) => Some(Image {
                    url: parse_absolute_url(&image_url)?,
                    alt: row
                        .get::<Option<String>, _>("image_alt")
                        .unwrap_or_default(),
                }),
                None => None,
            };

            items.push(NewsItem {
                title: row.get("title"),
                category: row
                    .get::<Option<String>, _>("category")
                    .unwrap_or_default(),
                reactions_info: row
                    .get::<Option<String>, _>("reactions_info")
                    .unwrap_or_default(),
                reactions_link,
                reactions: reactions_by_item.remove(&id).unwrap_or_default(),
                article_link: parse_absolute_url(&row.get::<String, _>("article_link"))?,
                image,
            });
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            category: "112".to_string(),
            reactions_info: "2 reacties".to_string(),
            reactions_link: Some(
                parse_absolute_url("https://www.waldnet.nl/reacties.php?id=1").unwrap(),
            ),
            reactions: vec![
                Reaction {
                    user: "Jan".to_string(),
                    text: "Wat in ferskriklike brân".to_string(),
                    language: Language::Fr,
                    likes: "5".to_string(),
                    nested_reactions: vec![
                        NestedReaction {
                            text: "Ja wis".to_string(),
                            language: Language::Fr,
                        },
                        NestedReaction {
                            text: "Nee hoor".to_string(),
                            language: Language::Nl,
                        },
                    ],
                },
                Reaction::default(),
            ],
            article_link: parse_absolute_url("https://www.waldnet.nl/nieuws/1").unwrap(),
            image: Some(Image {
                url: parse_absolute_url("https://www.waldnet.nl/foto/1.jpg").unwrap(),
                alt: "foto".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let item = sample_item("Brand in Ljouwert");
        let id = storage.store_item(&item).await.unwrap();
        assert!(id > 0);

        let latest = storage.latest(1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0], item);
    }

    #[tokio::test]
    async fn test_round_trip_without_reactions_or_image() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let item = NewsItem {
            title: "Brand in Ljouwert".to_string(),
            category: String::new(),
            reactions_info: String::new(),
            reactions_link: None,
            reactions: Vec::new(),
            article_link: parse_absolute_url("https://www.waldnet.nl/nieuws/123").unwrap(),
            image: None,
        };
        storage.store_item(&item).await.unwrap();

        let latest = storage.latest(1).await.unwrap();
        assert_eq!(latest[0], item);
        assert!(latest[0].reactions.is_empty());
        assert!(latest[0].image.is_none());
    }

    #[tokio::test]
    async fn test_latest_limit_and_order() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        for i in 1..=7 {
            storage
                .store_item(&sample_item(&format!("Item {}", i)))
                .await
                .unwrap();
        }

        let latest = storage.latest(5).await.unwrap();
        assert_eq!(latest.len(), 5);
        let titles: Vec<&str> = latest.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Item 7", "Item 6", "Item 5", "Item 4", "Item 3"]);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let first = SqliteStorage::new_with_path(&db_path).await.unwrap();
        first.store_item(&sample_item("before reopen")).await.unwrap();
        drop(first);

        // Second open re-runs every migration against the existing schema.
        let second = SqliteStorage::new_with_path(&db_path).await.unwrap();
        let latest = second.latest(10).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].title, "before reopen");
    }

    #[tokio::test]
    async fn test_reaction_order_is_preserved() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let mut item = sample_item("ordered");
        item.reactions = (0..5)
            .map(|i| Reaction {
                user: format!("user{}", i),
                ..Reaction::default()
            })
            .collect();
        storage.store_item(&item).await.unwrap();

        let latest = storage.latest(1).await.unwrap();
        let users: Vec<&str> = latest[0]
            .reactions
            .iter()
            .map(|reaction| reaction.user.as_str())
            .collect();
        assert_eq!(users, vec!["user0", "user1", "user2", "user3", "user4"]);
    }
}
