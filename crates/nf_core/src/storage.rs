use async_trait::async_trait;

use crate::types::{ArticlePage, ArticleRecord, Page, StoredArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Store the record unless one with the same `(link, source_name)` exists.
    ///
    /// Returns `true` alongside the freshly stored entity, or `false` with the
    /// entity that was already there. Concurrent calls for the same pair must
    /// produce exactly one `true`.
    async fn insert_if_absent(&self, record: &ArticleRecord) -> Result<(bool, StoredArticle)>;

    async fn get(&self, id: i64) -> Result<Option<StoredArticle>>;

    /// Newest `published_at` first.
    async fn list(&self, page: Page) -> Result<ArticlePage>;

    async fn get_by_source(&self, source: &str) -> Result<Vec<StoredArticle>>;

    /// Distinct source names, sorted.
    async fn sources(&self) -> Result<Vec<String>>;

    async fn count(&self) -> Result<usize>;
}
