use serde::{Deserialize, Serialize};
use url::Url;

use crate::language::Language;
use crate::{Error, Result};

/// Parse a string as an absolute URL. This is the single validation point for
/// every link field in the model: the structs below hold `Url`, so an invalid
/// or relative link can never enter a constructed item.
pub fn parse_absolute_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Thumbnail attached to a news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: Url,
    pub alt: String,
}

/// A one-level-deep reply to a reaction. Deeper replies in the markup are
/// intentionally not captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedReaction {
    pub text: String,
    pub language: Language,
}

/// A top-level reader comment on a news item, in source document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub user: String,
    pub text: String,
    pub language: Language,
    /// Like count as shown on the page. Kept as opaque text: the source label
    /// format is unspecified and may carry formatting.
    pub likes: String,
    pub nested_reactions: Vec<NestedReaction>,
}

impl Default for Reaction {
    fn default() -> Self {
        Self {
            user: "Unknown".to_string(),
            text: String::new(),
            language: Language::Unknown,
            likes: "0".to_string(),
            nested_reactions: Vec::new(),
        }
    }
}

/// One article summary entry from the front page, with its reactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub category: String,
    /// Free-text reactions summary as shown on the page, e.g. "12 reacties".
    pub reactions_info: String,
    pub reactions_link: Option<Url>,
    pub reactions: Vec<Reaction>,
    pub article_link: Url,
    pub image: Option<Image>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_url() {
        assert!(parse_absolute_url("https://www.waldnet.nl/nieuws/123").is_ok());
        assert!(parse_absolute_url("/nieuws/123").is_err());
        assert!(parse_absolute_url("not a url").is_err());
        assert!(parse_absolute_url("").is_err());
    }

    #[test]
    fn test_parse_error_variant() {
        match parse_absolute_url("nieuws.php") {
            Err(Error::InvalidUrl(msg)) => assert!(msg.contains("nieuws.php")),
            other => panic!("expected InvalidUrl, got {:?}", other.map(|u| u.to_string())),
        }
    }

    #[test]
    fn test_reaction_defaults() {
        let reaction = Reaction::default();
        assert_eq!(reaction.user, "Unknown");
        assert_eq!(reaction.likes, "0");
        assert_eq!(reaction.language, Language::Unknown);
        assert!(reaction.nested_reactions.is_empty());
    }
}
