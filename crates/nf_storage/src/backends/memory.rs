use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use nf_core::{ArticlePage, ArticleRecord, ArticleStorage, Page, Result, StoredArticle};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<StoredArticle>,
    index: HashMap<(String, String), usize>,
    next_id: i64,
}

impl MemoryStore {
    pub fn insert_if_absent(&mut self, record: &ArticleRecord) -> (bool, StoredArticle) {
        let key = (record.link.clone(), record.source_name.clone());
        if let Some(&pos) = self.index.get(&key) {
            return (false, self.articles[pos].clone());
        }

        self.next_id += 1;
        let stored = StoredArticle::from_record(self.next_id, record, Utc::now());
        self.index.insert(key, self.articles.len());
        self.articles.push(stored.clone());
        (true, stored)
    }

    pub fn get(&self, id: i64) -> Option<StoredArticle> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn list(&self, page: Page) -> ArticlePage {
        let mut sorted: Vec<&StoredArticle> = self.articles.iter().collect();
        // None sorts last, ties keep the newest row first
        sorted.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));
        let articles = sorted
            .into_iter()
            .skip(page.offset())
            .take(page.per_page())
            .cloned()
            .collect();
        ArticlePage::new(articles, self.articles.len(), page)
    }

    pub fn get_by_source(&self, source: &str) -> Vec<StoredArticle> {
        self.articles
            .iter()
            .filter(|a| a.source_name == source)
            .cloned()
            .collect()
    }

    pub fn sources(&self) -> Vec<String> {
        self.articles
            .iter()
            .map(|a| a.source_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Process-local store. The write lock makes `insert_if_absent` atomic.
#[derive(Default)]
pub struct InMemoryStorage {
    store: RwLock<MemoryStore>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> Result<(bool, StoredArticle)> {
        let mut store = self.store.write().await;
        Ok(store.insert_if_absent(record))
    }

    async fn get(&self, id: i64) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.get(id))
    }

    async fn list(&self, page: Page) -> Result<ArticlePage> {
        Ok(self.store.read().await.list(page))
    }

    async fn get_by_source(&self, source: &str) -> Result<Vec<StoredArticle>> {
        Ok(self.store.read().await.get_by_source(source))
    }

    async fn sources(&self) -> Result<Vec<String>> {
        Ok(self.store.read().await.sources())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.articles.len())
    }
}
