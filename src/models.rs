//! Data models flowing through the digest pipeline.
//!
//! - [`SourceDescriptor`]: one configured outlet with its link rule and content selector
//! - [`ArticleRef`] / [`ExtractedArticle`]: a discovered article before and after extraction
//! - [`Chunk`]: a bounded slice of an article body
//! - [`ToneProfile`] / [`ToneSummary`]: an ideological lens and what it produced
//! - [`Digest`]: the rendered message for one article
//!
//! Everything here lives for a single run; nothing is persisted.

use crate::error::Result;
use crate::utils::upcase;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One configured news outlet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceDescriptor {
    /// Unique, human-readable name shown in the digest header.
    pub name: String,
    /// Section page listing the latest articles.
    pub listing_url: String,
    /// Rule deciding which links on the listing page are articles.
    pub link_rule: LinkRule,
    /// Where the article body lives on an article page.
    pub content: ContentSelector,
}

/// How a listing page link is classified as an article.
///
/// Both variants are evaluated against the path of the resolved link.
///
/// ```yaml
/// link_rule: { kind: substring, pattern: "/politica/" }
/// link_rule: { kind: regex_fullmatch, pattern: '/\d{6,}-.+' }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "snake_case")]
pub enum LinkRule {
    /// The path must contain this section marker.
    Substring(String),
    /// The whole path must match this regular expression.
    RegexFullmatch(String),
}

impl LinkRule {
    /// Compile the rule once so it can be applied to every link of a listing page.
    pub fn compile(&self) -> Result<LinkMatcher> {
        Ok(match self {
            LinkRule::Substring(marker) => LinkMatcher::Substring(marker.clone()),
            LinkRule::RegexFullmatch(pattern) => {
                LinkMatcher::Regex(Regex::new(&format!("^(?:{pattern})$"))?)
            }
        })
    }
}

/// A compiled [`LinkRule`].
#[derive(Debug, Clone)]
pub enum LinkMatcher {
    Substring(String),
    Regex(Regex),
}

impl LinkMatcher {
    /// Whether a resolved link path belongs to the source's article section.
    ///
    /// # Arguments
    ///
    /// * `path` - URL path only; query and fragment are not considered.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            LinkMatcher::Substring(marker) => path.contains(marker.as_str()),
            LinkMatcher::Regex(re) => re.is_match(path),
        }
    }
}

/// A single element predicate: tag name, optional class, optional attributes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElementSelector {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl ElementSelector {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: None,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_class(tag: &str, class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            ..Self::tag(tag)
        }
    }

    /// Render as a CSS selector, e.g. `div.newsfull__body[data-type="body"]`.
    ///
    /// A class value holding several names (`"a b"`) requires all of them
    /// (`div.a.b`).
    pub fn to_css(&self) -> String {
        let mut css = self.tag.clone();
        if let Some(class) = &self.class {
            for name in class.split_whitespace() {
                css.push('.');
                css.push_str(name);
            }
        }
        for (name, value) in &self.attrs {
            css.push_str(&format!("[{}=\"{}\"]", name, value.replace('"', "\\\"")));
        }
        css
    }
}

/// Primary content selector plus the ordered fallbacks tried when it matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentSelector {
    pub primary: ElementSelector,
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<ElementSelector>,
}

impl ContentSelector {
    pub fn new(primary: ElementSelector) -> Self {
        Self {
            primary,
            fallbacks: default_fallbacks(),
        }
    }

    /// Primary first, then the fallbacks in order.
    pub fn candidates(&self) -> impl Iterator<Item = &ElementSelector> {
        std::iter::once(&self.primary).chain(self.fallbacks.iter())
    }
}

/// Generic containers seen across news sites whose markup drifts.
pub fn default_fallbacks() -> Vec<ElementSelector> {
    vec![
        ElementSelector::with_class("div", "content"),
        ElementSelector::with_class("div", "article-body"),
        ElementSelector::with_class("div", "post-content"),
        ElementSelector::tag("article"),
        ElementSelector::tag("main"),
    ]
}

/// An article URL discovered on a source's listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    /// Absolute article URL.
    pub url: String,
    /// Name of the owning [`SourceDescriptor`].
    pub source: String,
}

/// An article whose body survived extraction and cleaning.
#[derive(Debug, Clone)]
pub struct ExtractedArticle {
    pub article: ArticleRef,
    /// Whitespace-collapsed plain text, never shorter than the configured minimum.
    pub body: String,
}

/// One bounded segment of an article body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position within the article.
    pub index: usize,
    pub text: String,
}

/// An ideological lens used to prompt summary generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToneProfile {
    /// Identifier, also used in the system instruction.
    pub id: String,
    /// Instruction placed before the article text.
    pub prompt: String,
    /// Heading shown in the digest; defaults to the capitalized id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ToneProfile {
    pub fn new(id: &str, prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            label: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| upcase(&self.id))
    }
}

/// Everything one tone produced for one article, chunks concatenated in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneSummary {
    pub tone: String,
    pub label: String,
    pub text: String,
    /// At least one chunk fell back to the sentinel.
    pub degraded: bool,
}

/// A rendered, length-capped message for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub source: String,
    pub url: String,
    pub text: String,
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_rule_matches_section_paths() {
        let matcher = LinkRule::Substring("/politica/".to_string())
            .compile()
            .unwrap();
        assert!(matcher.matches("/politica/milei-veta-la-ley-nid123/"));
        assert!(!matcher.matches("/deportes/boca-river/"));
    }

    #[test]
    fn test_regex_rule_requires_full_match() {
        let matcher = LinkRule::RegexFullmatch(r"/\d{6,}-.+".to_string())
            .compile()
            .unwrap();
        assert!(matcher.matches("/812345-el-gobierno-anuncio"));
        assert!(!matcher.matches("/secciones/812345-el-gobierno"));
        assert!(!matcher.matches("/12345-corto"));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(LinkRule::RegexFullmatch("(".to_string()).compile().is_err());
    }

    #[test]
    fn test_element_selector_css() {
        assert_eq!(ElementSelector::tag("main").to_css(), "main");
        assert_eq!(
            ElementSelector::with_class("div", "com-paragraph").to_css(),
            "div.com-paragraph"
        );

        let mut sel = ElementSelector::tag("section");
        sel.attrs.insert("data-role".to_string(), "body".to_string());
        assert_eq!(sel.to_css(), "section[data-role=\"body\"]");
    }

    #[test]
    fn test_multi_class_selector_requires_every_class() {
        assert_eq!(ElementSelector::with_class("div", "a b").to_css(), "div.a.b");
        assert_eq!(
            ElementSelector::with_class("div", "  article-body   main ").to_css(),
            "div.article-body.main"
        );

        let html = scraper::Html::parse_document(
            r#"<div class="a"><div class="b">wrong</div></div><div class="b a">right</div>"#,
        );
        let css = ElementSelector::with_class("div", "a b").to_css();
        let selector = scraper::Selector::parse(&css).unwrap();
        let texts: Vec<String> = html.select(&selector).map(|e| e.text().collect()).collect();
        assert_eq!(texts, vec!["right".to_string()]);
    }

    #[test]
    fn test_candidates_order() {
        let selector = ContentSelector::new(ElementSelector::with_class("div", "newsfull__body"));
        let css: Vec<String> = selector.candidates().map(|s| s.to_css()).collect();
        assert_eq!(
            css,
            vec![
                "div.newsfull__body",
                "div.content",
                "div.article-body",
                "div.post-content",
                "article",
                "main",
            ]
        );
    }

    #[test]
    fn test_link_rule_yaml_shape() {
        let yaml = "kind: regex_fullmatch\npattern: '/\\d{6,}-.+'\n";
        let rule: LinkRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule, LinkRule::RegexFullmatch(r"/\d{6,}-.+".to_string()));
    }

    #[test]
    fn test_tone_display_name() {
        let tone = ToneProfile::new("neutral informativo", "Resumí");
        assert_eq!(tone.display_name(), "Neutral informativo");

        let labelled = ToneProfile {
            label: Some("Neutral".to_string()),
            ..tone
        };
        assert_eq!(labelled.display_name(), "Neutral");
    }
}
