use nf_core::{ItemSkipped, ParseError, SiteConfig};
use scraper::{ElementRef, Html, Selector};

use super::{ExtractContext, ItemResult};
use crate::normalize::{self, descendants, non_empty_attr};

/// Selector-driven extraction for one known site family.
#[derive(Debug)]
pub struct SiteStrategy {
    id: String,
    name: String,
    domains: Vec<String>,
    containers: Vec<Selector>,
    title: Vec<Selector>,
    link: Vec<Selector>,
    summary: Vec<Selector>,
    image: Vec<Selector>,
    max_items: usize,
}

impl SiteStrategy {
    pub fn from_config(site: &SiteConfig) -> Result<Self, ParseError> {
        let selectors = &site.selectors;
        Ok(Self {
            id: site.id.clone(),
            name: site.name.clone(),
            domains: site.domains.iter().map(|d| d.to_lowercase()).collect(),
            containers: normalize::compile_selectors(&selectors.containers)?,
            title: normalize::compile_selectors(&selectors.title)?,
            link: normalize::compile_selectors(&selectors.link)?,
            summary: normalize::compile_selectors(&selectors.summary)?,
            image: normalize::compile_selectors(&selectors.image)?,
            max_items: selectors.max_items,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// `host` must already be lower-cased.
    pub fn matches_host(&self, host: &str) -> bool {
        self.domains.iter().any(|d| host.contains(d.as_str()))
    }

    /// Containers from the first container selector that matches anything.
    fn containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        for selector in &self.containers {
            let found: Vec<_> = document.select(selector).take(self.max_items).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    pub fn extract_items(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<ItemResult> {
        self.containers(document)
            .into_iter()
            .map(|container| self.extract_container(container, ctx))
            .collect()
    }

    fn extract_container(&self, container: ElementRef<'_>, ctx: &ExtractContext<'_>) -> ItemResult {
        let title = self
            .title
            .iter()
            .filter_map(|sel| descendants(container, sel).next())
            .map(normalize::clean_text)
            .find(|t| !t.is_empty())
            .ok_or(ItemSkipped::MissingTitle)?;

        let href = self
            .link
            .iter()
            .flat_map(|sel| descendants(container, sel))
            .find_map(|a| non_empty_attr(a, "href"))
            .ok_or(ItemSkipped::MissingLink)?;
        let link = normalize::resolve_url(ctx.base, href)
            .ok_or_else(|| ItemSkipped::UnresolvableLink(href.to_string()))?;

        let summary = self
            .summary
            .iter()
            .find_map(|sel| descendants(container, sel).next())
            .map(normalize::clean_text)
            .unwrap_or_default();

        let image = self
            .image
            .iter()
            .find_map(|sel| descendants(container, sel).next());
        let image = normalize::image_url(image, ctx.base);

        Ok(normalize::assemble(title, link, summary, image, ctx))
    }
}
