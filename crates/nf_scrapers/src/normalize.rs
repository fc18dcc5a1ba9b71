//! Shared normalization: text cleanup, URL resolution and record assembly.
//! Every strategy funnels its raw picks through here.

use nf_core::{ArticleRecord, ParseError};
use scraper::{ElementRef, Selector};
use url::Url;

use crate::strategies::ExtractContext;

/// Collapse all whitespace runs in the element's text to single spaces.
pub fn clean_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against `base`. Absolute URLs are returned untouched.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Descendants of `scope` matching `selector`, excluding `scope` itself.
pub fn descendants<'a>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let scope_id = scope.id();
    scope.select(selector).filter(move |el| el.id() != scope_id)
}

pub fn non_empty_attr<'a>(element: ElementRef<'a>, attr: &str) -> Option<&'a str> {
    element
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn compile_selectors(raw: &[String]) -> Result<Vec<Selector>, ParseError> {
    raw.iter()
        .map(|s| {
            Selector::parse(s).map_err(|e| ParseError::InvalidSelector {
                selector: s.clone(),
                reason: format!("{:?}", e),
            })
        })
        .collect()
}

/// Resolve an image `src` the same way links are resolved.
pub fn image_url(element: Option<ElementRef<'_>>, base: &Url) -> Option<String> {
    element
        .and_then(|img| non_empty_attr(img, "src"))
        .and_then(|src| resolve_url(base, src))
}

pub fn assemble(
    title: String,
    link: String,
    summary: String,
    preview_image_url: Option<String>,
    ctx: &ExtractContext<'_>,
) -> ArticleRecord {
    ArticleRecord {
        title,
        summary,
        preview_image_url,
        link,
        source_name: ctx.source_name.to_string(),
        published_at: Some(ctx.extracted_at),
    }
}
