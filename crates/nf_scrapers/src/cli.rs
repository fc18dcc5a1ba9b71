use clap::{Args, Subcommand};
use nf_core::{Error, Result, StoredArticle};

use crate::manager::{ScraperManager, SiteReport};

/// Titles are listed when a single-URL run stores at most this many.
const LIST_TITLES_UP_TO: usize = 5;

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Scrape a single page and store new articles under the given source name
    Url {
        url: String,
        /// Source name recorded on every stored article
        #[arg(long)]
        source: String,
    },
    /// Scrape every seed URL of a configured site (e.g. bbc, cnn)
    Site { id: String },
    /// Scrape every configured site
    All,
    /// List configured sites
    List,
}

/// Run one scraper command; returns the number of newly stored articles.
pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<usize> {
    match args.command {
        ScraperCommands::Url { url, source } => {
            let source = source.trim();
            if source.is_empty() {
                return Err(Error::Config("source name must not be empty".to_string()));
            }
            println!("Scraping {} (source: {})...", url, source);
            let stored = manager.extract_and_store(&url, source).await;
            println!("✓ {} new articles", stored.len());
            if stored.len() <= LIST_TITLES_UP_TO {
                print_titles(&stored);
            }
            Ok(stored.len())
        }
        ScraperCommands::Site { id } => {
            let report = manager.scrape_site(&id).await?;
            print_report(&report);
            Ok(report.total_stored())
        }
        ScraperCommands::All => {
            println!("Scraping all configured sites...");
            let reports = manager.scrape_all().await;
            let total: usize = reports.iter().map(SiteReport::total_stored).sum();
            for report in &reports {
                print_report(report);
            }
            println!("Scraping finished. Total: {} new articles", total);
            Ok(total)
        }
        ScraperCommands::List => {
            println!("Available sites:");
            for site in manager.sites() {
                println!("  {} - {} ({})", site.id, site.name, site.domains.join(", "));
                for url in &site.urls {
                    println!("      {}", url);
                }
            }
            Ok(0)
        }
    }
}

fn print_titles(stored: &[StoredArticle]) {
    for line in title_lines(stored) {
        println!("{}", line);
    }
}

fn title_lines(stored: &[StoredArticle]) -> Vec<String> {
    stored
        .iter()
        .enumerate()
        .map(|(i, article)| format!("  {}. {}", i + 1, article.title))
        .collect()
}

fn print_report(report: &SiteReport) {
    println!("{}:", report.site_name);
    for page in &report.pages {
        println!("  ✓ {} new articles from {}", page.stored.len(), page.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{DocumentFetcher, RawDocument};
    use crate::logging::Logger;
    use async_trait::async_trait;
    use clap::Parser;
    use chrono::Utc;
    use nf_core::{ArticleRecord, FetchCause, FetchError, NewsConfig};
    use nf_storage::InMemoryStorage;
    use std::sync::Arc;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: ScraperCommands,
    }

    struct OfflineFetcher;

    #[async_trait]
    impl DocumentFetcher for OfflineFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError> {
            Err(FetchError::new(url, FetchCause::Transport("offline".to_string())))
        }
    }

    fn manager() -> ScraperManager {
        let mut config = NewsConfig::default();
        config.scraping.delay_secs = 0;
        ScraperManager::new(
            config,
            Arc::new(InMemoryStorage::new()),
            Arc::new(OfflineFetcher),
            Logger::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_url_command() {
        let cli = TestCli::parse_from(["nf", "url", "https://www.bbc.com/news", "--source", "BBC News"]);
        match cli.command {
            ScraperCommands::Url { url, source } => {
                assert_eq!(url, "https://www.bbc.com/news");
                assert_eq!(source, "BBC News");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_url_requires_source() {
        assert!(TestCli::try_parse_from(["nf", "url", "https://www.bbc.com/news"]).is_err());
    }

    #[tokio::test]
    async fn test_empty_source_rejected() {
        let args = ScraperArgs {
            command: ScraperCommands::Url {
                url: "https://www.bbc.com/news".to_string(),
                source: "  ".to_string(),
            },
        };
        assert!(matches!(handle_command(args, &manager()).await, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_offline_scrape_reports_zero() {
        let manager = manager();
        let args = ScraperArgs {
            command: ScraperCommands::Url {
                url: "https://www.bbc.com/news".to_string(),
                source: "BBC News".to_string(),
            },
        };
        assert_eq!(handle_command(args, &manager).await.unwrap(), 0);

        let args = ScraperArgs {
            command: ScraperCommands::Site { id: "nope".to_string() },
        };
        assert!(matches!(handle_command(args, &manager).await, Err(Error::UnknownSite(_))));
    }

    #[test]
    fn test_title_lines_are_not_truncated() {
        let title = "A headline that runs well past the fifty character display limit";
        let record = ArticleRecord {
            title: title.to_string(),
            summary: String::new(),
            preview_image_url: None,
            link: "https://www.bbc.com/news/1".to_string(),
            source_name: "BBC News".to_string(),
            published_at: None,
        };
        let stored = StoredArticle::from_record(1, &record, Utc::now());
        assert_eq!(title_lines(&[stored]), vec![format!("  1. {}", title)]);
    }
}
