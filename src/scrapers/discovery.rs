//! Link discovery on a source's listing page.
//!
//! All `a[href]` elements are resolved against the listing URL, classified by
//! the source's link rule (applied to the resolved path), deduplicated and
//! capped. A listing page that cannot be fetched yields no articles.

use crate::error::Result;
use crate::models::{ArticleRef, SourceDescriptor};
use crate::scrapers::fetch::PageFetcher;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument};
use url::Url;

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Fetch a source's listing page and return at most `max` distinct article URLs.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn discover(
    fetcher: &PageFetcher,
    source: &SourceDescriptor,
    max: usize,
) -> Vec<ArticleRef> {
    let html = match fetcher.fetch_html(&source.listing_url).await {
        Ok(html) => html,
        Err(e) => {
            error!(url = %source.listing_url, error = %e, "Failed to fetch listing page");
            return Vec::new();
        }
    };

    match article_links(&html, source, max) {
        Ok(refs) => refs,
        Err(e) => {
            error!(url = %source.listing_url, error = %e, "Failed to classify listing links");
            Vec::new()
        }
    }
}

/// Classify the links of an already fetched listing page.
pub fn article_links(html: &str, source: &SourceDescriptor, max: usize) -> Result<Vec<ArticleRef>> {
    let base = Url::parse(&source.listing_url)?;
    let matcher = source.link_rule.compile()?;
    let document = Html::parse_document(html);

    let urls: Vec<String> = document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| matcher.matches(url.path()))
        .map(|mut url| {
            url.set_fragment(None);
            url.to_string()
        })
        .unique()
        .collect();

    info!(found = urls.len(), kept = urls.len().min(max), "Indexed article links");
    debug!(urls = ?urls, "Article links");

    Ok(urls
        .into_iter()
        .take(max)
        .map(|url| ArticleRef {
            url,
            source: source.name.clone(),
        })
        .collect())
}
