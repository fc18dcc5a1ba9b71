use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nf_core::{ArticlePage, ArticleRecord, ArticleStorage, Error, Page, Result, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        summary TEXT NOT NULL DEFAULT '',
        preview_image_url TEXT,
        link TEXT NOT NULL,
        source_name TEXT NOT NULL,
        published_at TEXT,
        scraped_at TEXT NOT NULL,
        UNIQUE (link, source_name)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at)",
];

const COLUMNS: &str = "id, title, summary, preview_image_url, link, source_name, published_at, scraped_at";

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn find_by_identity(&self, link: &str, source_name: &str) -> Result<StoredArticle> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE link = ? AND source_name = ?",
            COLUMNS
        ))
        .bind(link)
        .bind(source_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to load existing article: {}", e)))?;
        row_to_article(&row)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date `{}`: {}", raw, e)))
}

fn row_to_article(row: &SqliteRow) -> Result<StoredArticle> {
    let column = |e: sqlx::Error| Error::Database(format!("Failed to decode row: {}", e));

    let published_at = row
        .try_get::<Option<String>, _>("published_at")
        .map_err(column)?
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;
    let scraped_at: String = row.try_get("scraped_at").map_err(column)?;

    Ok(StoredArticle {
        id: row.try_get("id").map_err(column)?,
        title: row.try_get("title").map_err(column)?,
        summary: row.try_get("summary").map_err(column)?,
        preview_image_url: row.try_get("preview_image_url").map_err(column)?,
        link: row.try_get("link").map_err(column)?,
        source_name: row.try_get("source_name").map_err(column)?,
        published_at,
        scraped_at: parse_timestamp(&scraped_at)?,
    })
}

fn rows_to_articles(rows: &[SqliteRow]) -> Result<Vec<StoredArticle>> {
    rows.iter().map(row_to_article).collect()
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> Result<(bool, StoredArticle)> {
        // The UNIQUE constraint arbitrates races: the losing insert returns no row.
        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO articles
            (title, summary, preview_image_url, link, source_name, published_at, scraped_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (link, source_name) DO NOTHING
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&record.title)
        .bind(&record.summary)
        .bind(record.preview_image_url.as_deref())
        .bind(&record.link)
        .bind(&record.source_name)
        .bind(record.published_at.map(|dt| dt.to_rfc3339()))
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store article: {}", e)))?;

        match inserted {
            Some(row) => Ok((true, row_to_article(&row)?)),
            None => {
                debug!("article already stored: {} ({})", record.link, record.source_name);
                let existing = self.find_by_identity(&record.link, &record.source_name).await?;
                Ok((false, existing))
            }
        }
    }

    async fn get(&self, id: i64) -> Result<Option<StoredArticle>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get article {}: {}", id, e)))?;
        row.as_ref().map(row_to_article).transpose()
    }

    async fn list(&self, page: Page) -> Result<ArticlePage> {
        let total = self.count().await?;
        // NULL dates sort last, matching the in-memory backend
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM articles
            ORDER BY published_at IS NULL, published_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
            COLUMNS
        ))
        .bind(page.per_page() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to list articles: {}", e)))?;

        Ok(ArticlePage::new(rows_to_articles(&rows)?, total, page))
    }

    async fn get_by_source(&self, source: &str) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE source_name = ? ORDER BY id",
            COLUMNS
        ))
        .bind(source)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get articles by source: {}", e)))?;
        rows_to_articles(&rows)
    }

    async fn sources(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT source_name FROM articles ORDER BY source_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list sources: {}", e)))?;
        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("source_name")
                    .map_err(|e| Error::Database(format!("Failed to decode row: {}", e)))
            })
            .collect()
    }

    async fn count(&self) -> Result<usize> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count articles: {}", e)))?;
        Ok(total as usize)
    }
}
