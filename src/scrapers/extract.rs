//! Article body extraction.
//!
//! The content container is the first element matched by the source's primary
//! selector or, failing that, by the first fallback that matches. Text under
//! `script`, `style`, `nav`, `footer` and `header` descendants is dropped, the
//! rest is joined and whitespace-collapsed. Bodies shorter than the minimum
//! length are treated as "content not found".

use crate::error::{NewsError, Result};
use crate::models::{ArticleRef, ContentSelector, ExtractedArticle};
use crate::scrapers::fetch::PageFetcher;
use crate::utils::{char_len, collapse_whitespace};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};

const NON_ARTICLE_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Fetch an article page and return its cleaned body.
#[instrument(level = "info", skip_all, fields(url = %article.url))]
pub async fn extract(
    fetcher: &PageFetcher,
    article: &ArticleRef,
    selector: &ContentSelector,
    min_len: usize,
) -> Result<ExtractedArticle> {
    let html = fetcher.fetch_html(&article.url).await?;
    let body = extract_text(&html, &article.url, selector, min_len)?;
    info!(chars = char_len(&body), "Extracted article body");
    Ok(ExtractedArticle {
        article: article.clone(),
        body,
    })
}

/// Locate the content container in `html` and return its cleaned text.
pub fn extract_text(
    html: &str,
    url: &str,
    selector: &ContentSelector,
    min_len: usize,
) -> Result<String> {
    let document = Html::parse_document(html);
    let container = find_container(&document, selector).ok_or_else(|| {
        NewsError::ContentNotFound {
            url: url.to_string(),
        }
    })?;

    let text = collapse_whitespace(&visible_text(container));
    let len = char_len(&text);
    if len < min_len {
        warn!(len, min_len, "Content too short");
        return Err(NewsError::ContentTooShort {
            url: url.to_string(),
            len,
        });
    }
    Ok(text)
}

fn find_container<'a>(document: &'a Html, selector: &ContentSelector) -> Option<ElementRef<'a>> {
    for (position, candidate) in selector.candidates().enumerate() {
        let css = candidate.to_css();
        let parsed = match Selector::parse(&css) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(selector = %css, error = %e, "Skipping unparsable selector");
                continue;
            }
        };
        if let Some(container) = document.select(&parsed).next() {
            if position > 0 {
                info!(selector = %css, "Primary selector missed; using fallback");
            }
            return Some(container);
        }
    }
    warn!("No selector matched, including fallbacks");
    None
}

/// Text nodes under `container`, skipping anything inside a non-article element.
fn visible_text(container: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != container.id())
            .filter_map(ElementRef::wrap)
            .any(|el| NON_ARTICLE_TAGS.contains(&el.value().name()));
        if !hidden {
            parts.push(&**text);
        }
    }
    parts.join(" ")
}
