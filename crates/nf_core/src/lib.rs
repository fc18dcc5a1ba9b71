pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::{NewsConfig, ScrapingConfig, SelectorBundle, SiteConfig};
pub use error::{Error, FetchCause, FetchError, ItemSkipped, ParseError};
pub use storage::ArticleStorage;
pub use types::{ArticlePage, ArticleRecord, Page, StoredArticle};

pub type Result<T> = std::result::Result<T, Error>;
