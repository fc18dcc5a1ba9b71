use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use nf_core::{ArticleStorage, Error, NewsConfig, Page, Result};
use nf_scrapers::{handle_command, init_logging, ScraperArgs, ScraperCommands, ScraperManager};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let secs = match c {
                    's' => Some(num),
                    'm' => num.checked_mul(60),
                    'h' => num.checked_mul(3600),
                    'd' => num.checked_mul(86400),
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = secs
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration too large".to_string())?;
            has_unit = true;
        }

        if !has_unit || total_seconds == 0 {
            return Err("Duration must be a positive number of seconds, minutes, hours or days".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Site-adaptive news scraper", long_about = None)]
struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, default_value = "sqlite")]
    storage: String,
    /// SQLite database file
    #[arg(long, default_value = nf_storage::DEFAULT_DB_PATH)]
    db_path: PathBuf,
    /// TOML configuration file; built-in sites are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Pages fetched at once by `scrape site` and `scrape all`
    #[arg(long)]
    concurrency: Option<usize>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch pages and store new articles
    Scrape {
        /// Repeat with this interval (e.g. 30m, 1h, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
        #[command(subcommand)]
        command: ScraperCommands,
    },
    /// List stored articles, newest first
    Articles {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        per_page: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show one stored article
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// List the distinct sources of stored articles
    Sources,
}

fn load_config(cli: &Cli) -> Result<NewsConfig> {
    let mut config = NewsConfig::load_or_default(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.scraping.timeout_secs = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.scraping.concurrency = concurrency;
    }
    Ok(config)
}

async fn list_articles(storage: &dyn ArticleStorage, page: Page, json: bool) -> Result<()> {
    let listing = storage.list(page).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    println!(
        "{} articles, page {} of {}",
        listing.total, listing.page, listing.total_pages
    );
    for article in &listing.articles {
        println!("[{}] {} ({})", article.id, article, article.source_name);
        println!("     {}", article.link);
    }
    Ok(())
}

async fn show_article(storage: &dyn ArticleStorage, id: i64, json: bool) -> Result<()> {
    let article = storage
        .get(id)
        .await?
        .ok_or_else(|| Error::Storage(format!("Article {} not found", id)))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
        return Ok(());
    }
    println!("{}", article.title);
    println!("Source:    {}", article.source_name);
    println!("Link:      {}", article.link);
    if let Some(image) = &article.preview_image_url {
        println!("Image:     {}", image);
    }
    if let Some(published_at) = article.published_at {
        println!("Published: {}", published_at.to_rfc3339());
    }
    println!("Scraped:   {}", article.scraped_at.to_rfc3339());
    if !article.summary.is_empty() {
        println!();
        println!("{}", article.summary);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let storage = nf_storage::create_storage(&cli.storage, Some(cli.db_path.as_path())).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    match cli.command {
        Commands::Scrape { interval, command } => {
            let args = ScraperArgs { command };
            let manager = ScraperManager::with_http(config, storage, logger.with_prefix("[scrape]"))?;
            let names: Vec<&str> = manager.sites().iter().map(|s| s.id.as_str()).collect();
            info!("🦗 Sites configured: {}", names.join(", "));

            match interval {
                Some(interval) => {
                    info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                    loop {
                        if let Err(e) = handle_command(args.clone(), &manager).await {
                            error!("Error during scrape: {}", e);
                        }
                        info!("Waiting {}s before next scrape", interval.0.as_secs());
                        tokio::time::sleep(interval.0).await;
                    }
                }
                None => {
                    handle_command(args, &manager).await?;
                }
            }
        }
        Commands::Articles { page, per_page, json } => {
            list_articles(storage.as_ref(), Page::new(page, per_page), json).await?;
        }
        Commands::Show { id, json } => {
            show_article(storage.as_ref(), id, json).await?;
        }
        Commands::Sources => {
            for source in storage.sources().await? {
                println!("{}", source);
            }
        }
    }

    Ok(())
}
