//! Scraping configuration: global fetch settings plus the table of known
//! site families.
//!
//! Every field has a default, so an empty (or absent) TOML file yields the
//! built-in table. A file that lists `[[sites]]` replaces the table entirely.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub scraping: ScrapingConfig,
    pub sites: Vec<SiteConfig>,
    /// Topic keywords. Kept as data; nothing filters on them yet.
    pub keywords: Vec<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            scraping: ScrapingConfig::default(),
            sites: default_sites(),
            keywords: [
                "tecnología",
                "technology",
                "ciencia",
                "science",
                "educación",
                "education",
                "innovación",
                "innovation",
                "digital",
                "online",
                "aprendizaje",
                "learning",
                "universidad",
                "university",
                "estudiante",
                "student",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl NewsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Load `path` when given, the built-in defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn site(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub timeout_secs: u64,
    pub max_items_per_page: usize,
    pub delay_secs: u64,
    pub user_agent: String,
    /// Upper bound on pages fetched at once by the batch drivers.
    pub concurrency: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_items_per_page: 20,
            delay_secs: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 4,
        }
    }
}

impl ScrapingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: String,
    /// Display name, used as the `source_name` of stored articles.
    pub name: String,
    /// Host substrings routed to this site's selectors.
    pub domains: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub selectors: SelectorBundle,
}

/// Ordered selector candidates; the first one that matches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorBundle {
    pub containers: Vec<String>,
    pub title: Vec<String>,
    pub link: Vec<String>,
    pub summary: Vec<String>,
    pub image: Vec<String>,
    pub max_items: usize,
}

impl Default for SelectorBundle {
    fn default() -> Self {
        Self {
            containers: strings(&["article"]),
            title: strings(&["h2", "h3"]),
            link: strings(&["a"]),
            summary: strings(&["p"]),
            image: strings(&["img"]),
            max_items: 10,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig {
            id: "bbc".into(),
            name: "BBC News".into(),
            domains: strings(&["bbc.com", "bbc.co.uk"]),
            urls: strings(&[
                "https://www.bbc.com/news",
                "https://www.bbc.com/news/world",
                "https://www.bbc.com/news/technology",
            ]),
            selectors: SelectorBundle {
                containers: strings(&["article", "div.gs-c-promo"]),
                title: strings(&["h3", "h2", "a.gs-c-promo-heading"]),
                summary: strings(&["p.gs-c-promo-summary"]),
                ..SelectorBundle::default()
            },
        },
        SiteConfig {
            id: "cnn".into(),
            name: "CNN".into(),
            domains: strings(&["cnn.com"]),
            urls: strings(&[
                "https://www.cnn.com/",
                "https://www.cnn.com/world",
                "https://www.cnn.com/technology",
            ]),
            selectors: SelectorBundle {
                containers: strings(&["article", "div.cnn-search__result"]),
                title: strings(&["h3", "h2"]),
                ..SelectorBundle::default()
            },
        },
        SiteConfig {
            id: "elpais".into(),
            name: "El País".into(),
            domains: strings(&["elpais.com"]),
            urls: strings(&[
                "https://elpais.com/",
                "https://elpais.com/internacional/",
                "https://elpais.com/tecnologia/",
            ]),
            selectors: SelectorBundle {
                containers: strings(&["article", "div.articulo"]),
                ..SelectorBundle::default()
            },
        },
        SiteConfig {
            id: "udea".into(),
            name: "UDEA".into(),
            domains: strings(&["udea.edu.co", "marca.com"]),
            urls: strings(&[
                "https://www.udea.edu.co/wps/portal/udea/web/inicio/udea-noticias/noticias-academia",
                "https://www.udea.edu.co/wps/portal/udea/web/inicio/udea-noticias/udea-noticia/Contenido/asNoticias/Cultura/museo-abierto-alianza-udea-upv",
                "https://www.udea.edu.co/wps/portal/udea/web/inicio/udea-noticias/udea-noticia/Contenido/asNoticias/PeriodicoAlmaMater/andreu-guzman",
            ]),
            selectors: SelectorBundle {
                containers: strings(&["article", "div.modulo"]),
                ..SelectorBundle::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NewsConfig::default();
        assert_eq!(config.scraping.timeout(), Duration::from_secs(10));
        assert_eq!(config.scraping.max_items_per_page, 20);
        assert_eq!(config.sites.len(), 4);
        assert!(config.site("bbc").is_some());
        assert!(config.site("reuters").is_none());
        assert!(config.sites.iter().all(|s| s.selectors.max_items == 10));
    }

    #[test]
    fn test_default_sites_carry_all_seed_urls() {
        let config = NewsConfig::default();
        assert!(config.sites.iter().all(|s| s.urls.len() == 3));
        let udea = config.site("udea").unwrap();
        assert!(udea.urls.iter().all(|u| u.starts_with("https://www.udea.edu.co/")));
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = NewsConfig::from_toml_str("").unwrap();
        assert_eq!(config.sites.len(), 4);
        assert_eq!(config.scraping.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = NewsConfig::from_toml_str(
            r#"
            [scraping]
            timeout_secs = 3

            [[sites]]
            id = "local"
            name = "Local Gazette"
            domains = ["gazette.example"]
            urls = ["https://gazette.example/"]

            [sites.selectors]
            containers = ["li.story"]
            title = ["h4"]
            "#,
        )
        .unwrap();

        assert_eq!(config.scraping.timeout_secs, 3);
        assert_eq!(config.scraping.max_items_per_page, 20);
        assert_eq!(config.sites.len(), 1);
        let site = &config.sites[0];
        assert_eq!(site.selectors.containers, vec!["li.story"]);
        assert_eq!(site.selectors.title, vec!["h4"]);
        assert_eq!(site.selectors.link, vec!["a"]);
        assert_eq!(site.selectors.max_items, 10);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = NewsConfig::from_toml_str("[scraping]\ntimeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "keywords = [\"rust\"]").unwrap();
        let config = NewsConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.keywords, vec!["rust"]);
        assert_eq!(config.sites.len(), 4);
    }
}
