use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DISPLAY_TITLE_CHARS: usize = 50;

/// An article teaser pulled out of a listing page, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    /// Empty when the page carries no summary.
    pub summary: String,
    pub preview_image_url: Option<String>,
    pub link: String,
    pub source_name: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl ArticleRecord {
    /// The `(link, source_name)` pair a store keeps unique.
    pub fn identity(&self) -> (&str, &str) {
        (&self.link, &self.source_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub preview_image_url: Option<String>,
    pub link: String,
    pub source_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
}

impl StoredArticle {
    pub fn from_record(id: i64, record: &ArticleRecord, scraped_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: record.title.clone(),
            summary: record.summary.clone(),
            preview_image_url: record.preview_image_url.clone(),
            link: record.link.clone(),
            source_name: record.source_name.clone(),
            published_at: record.published_at,
            scraped_at,
        }
    }
}

impl fmt::Display for StoredArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.chars().count() > DISPLAY_TITLE_CHARS {
            let short: String = self.title.chars().take(DISPLAY_TITLE_CHARS).collect();
            write!(f, "{}...", short)
        } else {
            f.write_str(&self.title)
        }
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: usize,
    per_page: usize,
}

impl Page {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePage {
    pub articles: Vec<StoredArticle>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl ArticlePage {
    pub fn new(articles: Vec<StoredArticle>, total: usize, page: Page) -> Self {
        Self {
            articles,
            total,
            page: page.page(),
            per_page: page.per_page(),
            total_pages: total.div_ceil(page.per_page()),
        }
    }
}
