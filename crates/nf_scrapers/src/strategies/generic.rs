use lazy_static::lazy_static;
use nf_core::ItemSkipped;
use scraper::{ElementRef, Html, Selector};

use super::{ExtractContext, ItemResult};
use crate::normalize::{self, descendants, non_empty_attr};

lazy_static! {
    static ref LINK: Selector = Selector::parse("a[href]").expect("static selector");
    static ref PARAGRAPH: Selector = Selector::parse("p").expect("static selector");
    static ref IMAGE: Selector = Selector::parse("img").expect("static selector");
}

pub const DEFAULT_LINK_KEYWORDS: &[&str] = &["news", "noticia", "article", "articulo"];

/// Hyperlink heuristics for pages no site strategy claims.
#[derive(Debug, Clone)]
pub struct GenericStrategy {
    keywords: Vec<String>,
    max_links: usize,
    min_title_chars: usize,
}

impl Default for GenericStrategy {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_LINK_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_links: 20,
            min_title_chars: 10,
        }
    }
}

impl GenericStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the first `max_links` anchors carrying an href are examined.
    pub fn extract_items(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<ItemResult> {
        document
            .select(&LINK)
            .filter_map(|a| non_empty_attr(a, "href").map(|href| (a, href)))
            .take(self.max_links)
            .map(|(a, href)| self.extract_link(a, href, ctx))
            .collect()
    }

    fn extract_link(&self, anchor: ElementRef<'_>, href: &str, ctx: &ExtractContext<'_>) -> ItemResult {
        let lowered = href.to_lowercase();
        if !self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            return Err(ItemSkipped::NoKeyword(href.to_string()));
        }

        let title = normalize::clean_text(anchor);
        let title_chars = title.chars().count();
        if title_chars < self.min_title_chars {
            return Err(ItemSkipped::TitleTooShort(title_chars));
        }

        let link = normalize::resolve_url(ctx.base, href)
            .ok_or_else(|| ItemSkipped::UnresolvableLink(href.to_string()))?;

        let parent = anchor.parent().and_then(ElementRef::wrap);
        let summary = parent
            .and_then(|p| descendants(p, &PARAGRAPH).next())
            .map(normalize::clean_text)
            .unwrap_or_default();

        let image = descendants(anchor, &IMAGE)
            .next()
            .or_else(|| parent.and_then(|p| descendants(p, &IMAGE).next()));
        let image = normalize::image_url(image, ctx.base);

        Ok(normalize::assemble(title, link, summary, image, ctx))
    }
}
