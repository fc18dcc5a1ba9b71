use async_trait::async_trait;
use nf_core::{Error, FetchCause, FetchError, Result, ScrapingConfig};
use reqwest::Client;

/// Raw HTML as returned by the server, tagged with the URL it was requested from.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: String,
    pub body: String,
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// One request, no retries.
    async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn classify(e: reqwest::Error) -> FetchCause {
    if e.is_timeout() {
        FetchCause::Timeout
    } else if let Some(status) = e.status() {
        FetchCause::Status(status.as_u16())
    } else {
        FetchCause::Transport(e.to_string())
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, classify(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchCause::Status(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, classify(e)))?;

        Ok(RawDocument {
            url: url.to_string(),
            body,
        })
    }
}
