pub mod error;
pub mod language;
pub mod models;
pub mod storage;

pub use error::Error;
pub use language::{classify, Language};
pub use models::{Image, NestedReaction, NewsItem, Reaction};
pub use storage::NewsStorage;

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Error, Image, Language, NestedReaction, NewsItem, Reaction, Result};
}
