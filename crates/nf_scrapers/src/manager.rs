use std::sync::Arc;

use futures::future::join_all;
use nf_core::{
    ArticleRecord, ArticleStorage, Error, NewsConfig, ParseError, Result, SiteConfig,
    StoredArticle,
};
use scraper::Html;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use url::Url;

use crate::dispatcher::Dispatcher;
use crate::fetcher::{DocumentFetcher, HttpFetcher, RawDocument};
use crate::logging::Logger;
use crate::strategies::{ExtractContext, Strategy};

/// Newly stored articles for one fetched page.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub url: String,
    pub stored: Vec<StoredArticle>,
}

#[derive(Debug, Clone)]
pub struct SiteReport {
    pub site_id: String,
    pub site_name: String,
    pub pages: Vec<PageReport>,
}

impl SiteReport {
    pub fn total_stored(&self) -> usize {
        self.pages.iter().map(|p| p.stored.len()).sum()
    }
}

pub struct ScraperManager {
    storage: Arc<dyn ArticleStorage>,
    fetcher: Arc<dyn DocumentFetcher>,
    dispatcher: Dispatcher,
    config: NewsConfig,
    logger: Logger,
}

impl ScraperManager {
    /// Fails only on configuration errors such as an unparsable selector.
    pub fn new(
        config: NewsConfig,
        storage: Arc<dyn ArticleStorage>,
        fetcher: Arc<dyn DocumentFetcher>,
        logger: Logger,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(&config)?;
        Ok(Self {
            storage,
            fetcher,
            dispatcher,
            config,
            logger,
        })
    }

    pub fn with_http(config: NewsConfig, storage: Arc<dyn ArticleStorage>, logger: Logger) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.scraping)?);
        Self::new(config, storage, fetcher, logger)
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.config.sites
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        &self.storage
    }

    pub fn select_strategy(&self, url: &str) -> Strategy<'_> {
        self.dispatcher.select_strategy(url)
    }

    /// Parse an already fetched document into candidate records.
    ///
    /// Skipped containers are logged and dropped; the result is capped at
    /// `max_items_per_page`.
    pub fn extract_document(&self, document: &RawDocument, source_name: &str) -> std::result::Result<Vec<ArticleRecord>, ParseError> {
        let base = Url::parse(&document.url)
            .map_err(|e| ParseError::InvalidBaseUrl(format!("{}: {}", document.url, e)))?;
        let strategy = self.select_strategy(&document.url);
        let logger = self.logger.with_prefix(format!("[{}]", strategy.name()));

        let html = Html::parse_document(&document.body);
        let ctx = ExtractContext::new(&base, source_name);

        let mut records = Vec::new();
        for item in strategy.extract_items(&html, &ctx) {
            match item {
                Ok(record) => records.push(record),
                Err(skipped) => logger.debug(&format!("skipped item on {}: {}", document.url, skipped)),
            }
        }
        records.truncate(self.config.scraping.max_items_per_page);
        Ok(records)
    }

    async fn try_extract(&self, url: &str, source_name: &str) -> Result<Vec<ArticleRecord>> {
        let document = self.fetcher.fetch(url).await?;
        Ok(self.extract_document(&document, source_name)?)
    }

    /// Fetch and extract without persisting. Failures yield an empty list.
    pub async fn extract(&self, url: &str, source_name: &str) -> Vec<ArticleRecord> {
        match self.try_extract(url, source_name).await {
            Ok(records) => records,
            Err(e) => {
                self.logger.warn(&format!("Error scraping {}: {}", url, e));
                Vec::new()
            }
        }
    }

    /// Fetch, extract and persist; returns only the articles that were new.
    ///
    /// Never fails: fetch and parse errors are logged and produce an empty
    /// list, and a record the store rejects is logged and left out.
    pub async fn extract_and_store(&self, url: &str, source_name: &str) -> Vec<StoredArticle> {
        let logger = self.logger.with_prefix(format!("[{}]", source_name));
        let records = match self.try_extract(url, source_name).await {
            Ok(records) => records,
            Err(e) => {
                logger.warn(&format!("Error scraping {}: {}", url, e));
                return Vec::new();
            }
        };

        let candidates = records.len();
        let mut stored = Vec::new();
        for record in &records {
            match self.storage.insert_if_absent(record).await {
                Ok((true, article)) => stored.push(article),
                Ok((false, _)) => {}
                Err(e) => logger.error(&format!("Failed to store {}: {}", record.link, e)),
            }
        }

        logger.info(&format!(
            "{} new of {} articles found on {}",
            stored.len(),
            candidates,
            url
        ));
        stored
    }

    pub async fn scrape_site(&self, site_id: &str) -> Result<SiteReport> {
        let site = self
            .config
            .site(site_id)
            .ok_or_else(|| Error::UnknownSite(site_id.to_string()))?;
        let mut reports = self.run_sites(std::slice::from_ref(site)).await;
        reports
            .pop()
            .ok_or_else(|| Error::UnknownSite(site_id.to_string()))
    }

    /// Every configured site; pages run concurrently up to `concurrency`.
    pub async fn scrape_all(&self) -> Vec<SiteReport> {
        self.run_sites(&self.config.sites).await
    }

    async fn run_sites(&self, sites: &[SiteConfig]) -> Vec<SiteReport> {
        let semaphore = Arc::new(Semaphore::new(self.config.scraping.concurrency.max(1)));
        let delay = self.config.scraping.delay();

        let jobs = sites.iter().enumerate().flat_map(|(index, site)| {
            site.urls.iter().map(move |url| (index, site, url))
        });
        let futures = jobs.map(|(index, site, url)| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| Error::External(e.into()))?;
                let stored = self.extract_and_store(url, &site.name).await;
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                Ok::<_, Error>((
                    index,
                    PageReport {
                        url: url.clone(),
                        stored,
                    },
                ))
            }
        });

        let mut reports: Vec<SiteReport> = sites
            .iter()
            .map(|site| SiteReport {
                site_id: site.id.clone(),
                site_name: site.name.clone(),
                pages: Vec::new(),
            })
            .collect();

        for result in join_all(futures).await {
            match result {
                Ok((index, page)) => reports[index].pages.push(page),
                Err(e) => self.logger.error(&format!("Scrape job failed: {}", e)),
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nf_core::{FetchCause, FetchError, ScrapingConfig, SelectorBundle};
    use nf_storage::InMemoryStorage;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned pages; unknown URLs time out.
    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl DocumentFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(url) {
                Some(body) => Ok(RawDocument {
                    url: url.to_string(),
                    body: body.clone(),
                }),
                None => Err(FetchError::new(url, FetchCause::Timeout)),
            }
        }
    }

    const BBC_PAGE: &str = r#"
        <html><body>
            <article><h3>First headline</h3><a href="/news/1">x</a><img src="/img/1.jpg"></article>
            <article><a href="/news/no-title">x</a></article>
            <article><h3>Second headline</h3><a href="https://www.bbc.com/news/2">x</a></article>
        </body></html>
    "#;

    fn test_config() -> NewsConfig {
        NewsConfig {
            scraping: ScrapingConfig {
                delay_secs: 0,
                ..ScrapingConfig::default()
            },
            ..NewsConfig::default()
        }
    }

    fn manager(fetcher: StubFetcher) -> (ScraperManager, Arc<InMemoryStorage>) {
        let storage = Arc::new(InMemoryStorage::new());
        let manager = ScraperManager::new(
            test_config(),
            storage.clone(),
            Arc::new(fetcher),
            Logger::new(),
        )
        .unwrap();
        (manager, storage)
    }

    #[tokio::test]
    async fn test_extract_and_store_is_idempotent() {
        let url = "https://www.bbc.com/news";
        let (manager, storage) = manager(StubFetcher::default().with_page(url, BBC_PAGE));

        let first = manager.extract_and_store(url, "BBC News").await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].link, "https://www.bbc.com/news/1");
        assert_eq!(first[0].preview_image_url.as_deref(), Some("https://www.bbc.com/img/1.jpg"));
        assert_eq!(first[1].link, "https://www.bbc.com/news/2");

        let second = manager.extract_and_store(url, "BBC News").await;
        assert!(second.is_empty());
        assert_eq!(storage.count().await.unwrap(), 2);

        // Same links under another source are new articles
        let other = manager.extract_and_store(url, "BBC Mirror").await;
        assert_eq!(other.len(), 2);
        assert_eq!(storage.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_absorbed() {
        let (manager, storage) = manager(StubFetcher::default());
        let stored = manager.extract_and_store("https://www.cnn.com/", "CNN").await;
        assert!(stored.is_empty());
        assert_eq!(storage.count().await.unwrap(), 0);
        assert!(manager.extract("https://www.cnn.com/", "CNN").await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_does_not_persist() {
        let url = "https://www.bbc.com/news";
        let (manager, storage) = manager(StubFetcher::default().with_page(url, BBC_PAGE));
        let records = manager.extract(url, "BBC News").await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.source_name == "BBC News"));
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_site_uses_generic_strategy() {
        let url = "https://blog.example/home";
        let page = r#"
            <ul>
                <li><a href="/news/launch">We launched a new product</a><p>Details inside</p></li>
                <li><a href="/contact">Contact us today please</a></li>
            </ul>
        "#;
        let (manager, _) = manager(StubFetcher::default().with_page(url, page));
        let stored = manager.extract_and_store(url, "Blog").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].link, "https://blog.example/news/launch");
        assert_eq!(stored[0].summary, "Details inside");
    }

    #[tokio::test]
    async fn test_concurrent_invocations_store_once() {
        let url = "https://www.bbc.com/news";
        let (manager, storage) = manager(StubFetcher::default().with_page(url, BBC_PAGE));

        let (a, b) = tokio::join!(
            manager.extract_and_store(url, "BBC News"),
            manager.extract_and_store(url, "BBC News")
        );
        assert_eq!(a.len() + b.len(), 2);
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_parse_error() {
        let (manager, _) = manager(StubFetcher::default());
        let doc = RawDocument {
            url: "not a url".to_string(),
            body: BBC_PAGE.to_string(),
        };
        assert!(matches!(
            manager.extract_document(&doc, "x"),
            Err(ParseError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_max_items_per_page_caps_records() {
        let url = "https://www.cnn.com/";
        let page: String = (0..8)
            .map(|i| format!("<article><h2>Story {}</h2><a href=\"/s/{}\">x</a></article>", i, i))
            .collect();
        let storage = Arc::new(InMemoryStorage::new());
        let mut config = test_config();
        config.scraping.max_items_per_page = 3;
        let manager = ScraperManager::new(
            config,
            storage,
            Arc::new(StubFetcher::default().with_page(url, &page)),
            Logger::new(),
        )
        .unwrap();
        assert_eq!(manager.extract(url, "CNN").await.len(), 3);
    }

    #[tokio::test]
    async fn test_scrape_site_and_all() {
        let site = |id: &str, host: &str| SiteConfig {
            id: id.to_string(),
            name: id.to_uppercase(),
            domains: vec![host.to_string()],
            urls: vec![format!("https://{}/a", host), format!("https://{}/b", host)],
            selectors: SelectorBundle::default(),
        };
        let page = |n: &str| format!("<article><h2>Story {}</h2><a href=\"/{}\">x</a></article>", n, n);

        let fetcher = StubFetcher::default()
            .with_page("https://one.example/a", &page("1"))
            .with_page("https://one.example/b", &page("2"))
            .with_page("https://two.example/a", &page("3"));
        // two.example/b is missing and times out
        let config = NewsConfig {
            scraping: ScrapingConfig {
                delay_secs: 0,
                concurrency: 2,
                ..ScrapingConfig::default()
            },
            sites: vec![site("one", "one.example"), site("two", "two.example")],
            keywords: vec![],
        };
        let fetcher = Arc::new(fetcher);
        let manager = ScraperManager::new(
            config,
            Arc::new(InMemoryStorage::new()),
            fetcher.clone(),
            Logger::new(),
        )
        .unwrap();

        let report = manager.scrape_site("one").await.unwrap();
        assert_eq!(report.site_name, "ONE");
        assert_eq!(report.total_stored(), 2);

        let reports = manager.scrape_all().await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].site_id, "one");
        assert_eq!(reports[0].total_stored(), 0);
        assert_eq!(reports[1].total_stored(), 1);
        assert_eq!(reports[1].pages.len(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 6);

        assert!(matches!(
            manager.scrape_site("three").await,
            Err(Error::UnknownSite(_))
        ));
    }
}
