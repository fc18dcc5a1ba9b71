pub mod cli;
pub mod dispatcher;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod normalize;
pub mod strategies;

pub use dispatcher::Dispatcher;
pub use fetcher::{DocumentFetcher, HttpFetcher, RawDocument};
pub use logging::{init_logging, Logger};
pub use manager::{PageReport, ScraperManager, SiteReport};
pub use strategies::{ExtractContext, GenericStrategy, SiteStrategy, Strategy};

pub use cli::{handle_command, ScraperArgs, ScraperCommands};

pub mod prelude {
    pub use super::manager::ScraperManager;
    pub use nf_core::{ArticleRecord, Error, Result, StoredArticle};
}
