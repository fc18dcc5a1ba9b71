use chrono::{DateTime, Utc};
use nf_core::{ArticleRecord, ItemSkipped};
use scraper::Html;
use url::Url;

pub mod generic;
pub mod site;

pub use generic::GenericStrategy;
pub use site::SiteStrategy;

pub type ItemResult = Result<ArticleRecord, ItemSkipped>;

/// Per-page inputs shared by every record a strategy emits.
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
    pub base: &'a Url,
    pub source_name: &'a str,
    /// Stamped as `published_at`; pages are not parsed for dates.
    pub extracted_at: DateTime<Utc>,
}

impl<'a> ExtractContext<'a> {
    pub fn new(base: &'a Url, source_name: &'a str) -> Self {
        Self {
            base,
            source_name,
            extracted_at: Utc::now(),
        }
    }
}

/// The strategy chosen for one URL.
#[derive(Debug, Clone, Copy)]
pub enum Strategy<'a> {
    Site(&'a SiteStrategy),
    Generic(&'a GenericStrategy),
}

impl<'a> Strategy<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Strategy::Site(s) => s.id(),
            Strategy::Generic(_) => "generic",
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Strategy::Generic(_))
    }

    /// One entry per examined container or link candidate.
    pub fn extract_items(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<ItemResult> {
        match self {
            Strategy::Site(s) => s.extract_items(document, ctx),
            Strategy::Generic(g) => g.extract_items(document, ctx),
        }
    }

    pub fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<ArticleRecord> {
        self.extract_items(document, ctx)
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }
}
