use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;
use wn_core::models::parse_absolute_url;
use wn_core::{classify, Image, Language, NestedReaction, NewsItem, Reaction, Result};

use super::blocks::{collect_blocks, link_reactions};
use super::utils::{attr_of, element_text, text_or};
use crate::fetch::PageFetcher;

pub const BASE_URL: &str = "https://www.waldnet.nl";
pub const NEWS_PAGE: &str = "https://www.waldnet.nl/nieuws.php";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Cap on front-page items processed per run.
    pub max_items: usize,
    /// Pause after each reactions-page fetch, as a courtesy to the server.
    pub request_delay: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            request_delay: Duration::from_secs(1),
        }
    }
}

pub struct WaldnetScraper {
    fetcher: Arc<dyn PageFetcher>,
    config: ScraperConfig,
}

impl WaldnetScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_config(fetcher, ScraperConfig::default())
    }

    pub fn with_config(fetcher: Arc<dyn PageFetcher>, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn source(&self) -> &str {
        "WaldNet"
    }

    /// One full pass: front page first, then each item's reactions page in
    /// sequence. A failed reactions fetch leaves that item with an empty
    /// reactions list and the pass continues; a failed front-page fetch fails
    /// the pass.
    pub async fn scrape_news(&self) -> Result<Vec<NewsItem>> {
        let html = self.fetcher.fetch(NEWS_PAGE).await?;
        let mut items = extract_front_page(&html, self.config.max_items);

        for item in &mut items {
            let Some(link) = item.reactions_link.clone() else {
                continue;
            };
            debug!("fetching reactions for '{}' from {}", item.title, link);
            match self.fetcher.fetch(link.as_str()).await {
                Ok(page) => item.reactions = extract_reactions(&page),
                Err(e) => {
                    warn!(
                        "failed to fetch reactions for '{}' from {}: {}",
                        item.title, link, e
                    );
                }
            }
            tokio::time::sleep(self.config.request_delay).await;
        }

        Ok(items)
    }
}

/// Resolve a front-page href: relative paths get the site origin prefixed,
/// anything already absolute is parsed as-is.
fn absolutize(href: &str) -> Result<Url> {
    if href.starts_with("http") {
        parse_absolute_url(href)
    } else {
        parse_absolute_url(&format!("{}{}", BASE_URL, href))
    }
}

/// Extract up to `max_items` news items from the front-page markup. The
/// reactions lists stay empty here; they are filled in from the linked
/// reactions pages afterwards. Optional fields fall back to their defaults;
/// only a missing or unparseable article link drops an item.
pub fn extract_front_page(html: &str, max_items: usize) -> Vec<NewsItem> {
    let document = Html::parse_document(html);
    let item_sel = Selector::parse("div.nieuws-item").unwrap();
    let title_sel = Selector::parse("h2.titel").unwrap();
    let category_sel = Selector::parse("div.categorie a").unwrap();
    let reactions_sel = Selector::parse("div.reacties-link").unwrap();
    let anchor_sel = Selector::parse("a").unwrap();
    let article_sel = Selector::parse("a.nieuws-link").unwrap();
    let image_sel = Selector::parse("img.nieuws-afbeelding").unwrap();

    let mut items = Vec::new();
    for container in document.select(&item_sel).take(max_items) {
        let title = text_or(container, &title_sel, "");
        let category = text_or(container, &category_sel, "");

        let (reactions_info, reactions_link) = match container.select(&reactions_sel).next() {
            Some(block) => {
                let info = element_text(block);
                let link = attr_of(block, &anchor_sel, "href").and_then(|href| {
                    match absolutize(&href) {
                        Ok(url) => Some(url),
                        Err(e) => {
                            warn!("ignoring reactions link on '{}': {}", title, e);
                            None
                        }
                    }
                });
                (info, link)
            }
            None => (String::new(), None),
        };

        let Some(article_anchor) = container.select(&article_sel).next() else {
            warn!("skipping news item '{}': no article link", title);
            continue;
        };
        let Some(href) = article_anchor.value().attr("href") else {
            warn!("skipping news item '{}': article anchor has no href", title);
            continue;
        };
        let article_link = match absolutize(href) {
            Ok(url) => url,
            Err(e) => {
                warn!("skipping news item '{}': {}", title, e);
                continue;
            }
        };

        let image = article_anchor.select(&image_sel).next().and_then(|img| {
            let src = img.value().attr("src")?;
            match absolutize(src) {
                Ok(url) => Some(Image {
                    url,
                    alt: img.value().attr("alt").unwrap_or("").to_string(),
                }),
                Err(e) => {
                    debug!("ignoring image on '{}': {}", title, e);
                    None
                }
            }
        });

        items.push(NewsItem {
            title,
            category,
            reactions_info,
            reactions_link,
            reactions: Vec::new(),
            article_link,
            image,
        });
    }
    items
}

/// Extract the top-level reactions (and one level of replies) from a
/// reactions page. Relies on the document-order block linking in
/// [`super::blocks`].
pub fn extract_reactions(html: &str) -> Vec<Reaction> {
    let document = Html::parse_document(html);
    let user_sel = Selector::parse("div.usernickname span").unwrap();
    let text_sel = Selector::parse("p").unwrap();
    let like_sel = Selector::parse("span.like-count").unwrap();
    let reply_sel = Selector::parse("div.reactie").unwrap();

    let blocks = collect_blocks(&document);
    let mut reactions = Vec::new();
    for linked in link_reactions(&blocks) {
        let user = text_or(linked.container, &user_sel, "Unknown");
        let text = text_or(linked.container, &text_sel, "");
        let language = classify_present(&text);
        let likes = linked
            .meta
            .map(|meta| text_or(meta, &like_sel, "0"))
            .unwrap_or_else(|| "0".to_string());

        let nested_reactions = linked
            .nested_group
            .map(|group| {
                group
                    .select(&reply_sel)
                    .map(|reply| {
                        let text = text_or(reply, &text_sel, "");
                        let language = classify_present(&text);
                        NestedReaction { text, language }
                    })
                    .collect()
            })
            .unwrap_or_default();

        reactions.push(Reaction {
            user,
            text,
            language,
            likes,
            nested_reactions,
        });
    }
    reactions
}

/// The classifier only ever sees actual text; a comment without any is
/// tagged `Unknown` rather than classified.
fn classify_present(text: &str) -> Language {
    if text.is_empty() {
        Language::Unknown
    } else {
        classify(text)
    }
}
