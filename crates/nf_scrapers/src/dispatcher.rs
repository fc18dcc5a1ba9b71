use nf_core::{NewsConfig, ParseError};
use url::Url;

use crate::strategies::{GenericStrategy, SiteStrategy, Strategy};

/// Ordered `(domains, strategy)` table with an unconditional generic fallback.
///
/// Entries are consulted in registration order and the first whose domain
/// substring occurs in the URL host wins.
#[derive(Debug)]
pub struct Dispatcher {
    sites: Vec<SiteStrategy>,
    generic: GenericStrategy,
}

impl Dispatcher {
    pub fn new(sites: Vec<SiteStrategy>, generic: GenericStrategy) -> Self {
        Self { sites, generic }
    }

    pub fn from_config(config: &NewsConfig) -> Result<Self, ParseError> {
        let sites = config
            .sites
            .iter()
            .map(SiteStrategy::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(sites, GenericStrategy::default()))
    }

    pub fn sites(&self) -> &[SiteStrategy] {
        &self.sites
    }

    pub fn select_strategy(&self, url: &str) -> Strategy<'_> {
        host_of(url)
            .and_then(|host| self.sites.iter().find(|s| s.matches_host(&host)))
            .map(Strategy::Site)
            .unwrap_or(Strategy::Generic(&self.generic))
    }
}

/// Lower-cased host of `url`, if it has one.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}
