//! Digest assembly.
//!
//! Layout (Telegram Markdown):
//!
//! ```text
//! 📰 *Página/12 - Comparativa de enfoques*
//!
//! 🗣 *Libertario*
//! <summary>
//!
//! 🗣 *Neutral informativo*
//! <summary>
//!
//! 🔗 https://www.pagina12.com.ar/812345-...
//! ```
//!
//! A render longer than the cap is cut to a prefix and ends with
//! [`TRUNCATION_MARKER`], so truncation is always visible.

use crate::models::{ArticleRef, Digest, ToneSummary};
use crate::utils::{char_len, take_chars};
use tracing::warn;

pub const TRUNCATION_MARKER: &str = "(message truncated)";

/// Render the digest for one article. Pure; lengths are in characters.
pub fn assemble(article: &ArticleRef, summaries: &[ToneSummary], cap: usize) -> Digest {
    let rendered = render(article, summaries);
    let (text, truncated) = cap_length(rendered, cap);
    if truncated {
        warn!(url = %article.url, cap, "Digest exceeded message cap; truncated");
    }
    Digest {
        source: article.source.clone(),
        url: article.url.clone(),
        text,
        truncated,
    }
}

fn render(article: &ArticleRef, summaries: &[ToneSummary]) -> String {
    let blocks = summaries
        .iter()
        .map(|s| format!("🗣 *{}*\n{}", s.label, s.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "📰 *{} - Comparativa de enfoques*\n\n{}\n\n🔗 {}",
        article.source, blocks, article.url
    )
}

/// Markers that open and close a span in Telegram's legacy Markdown.
const MARKUP_MARKERS: [char; 3] = ['*', '_', '`'];

/// Cut `text` to at most `cap` characters, marker included.
///
/// The kept prefix never ends inside an open Markdown span: a cut through
/// `*Neutral inf` would otherwise leave an odd number of `*` and the transport
/// rejects the whole message.
///
/// # Returns
///
/// The capped text and whether anything was cut.
pub fn cap_length(text: String, cap: usize) -> (String, bool) {
    if char_len(&text) <= cap {
        return (text, false);
    }

    let marker_len = char_len(TRUNCATION_MARKER);
    if cap <= marker_len + 1 {
        return (take_chars(TRUNCATION_MARKER, cap).to_string(), true);
    }

    let prefix = balance_markup(take_chars(&text, cap - marker_len - 1));
    (format!("{}
{TRUNCATION_MARKER}", prefix.trim_end()), true)
}

/// Drop the last occurrence of each span marker left without a partner.
fn balance_markup(text: &str) -> String {
    let mut out = text.to_string();
    for marker in MARKUP_MARKERS {
        if out.matches(marker).count() % 2 == 1 {
            if let Some(pos) = out.rfind(marker) {
                out.remove(pos);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::SUMMARY_UNAVAILABLE;

    fn article() -> ArticleRef {
        ArticleRef {
            url: "https://www.pagina12.com.ar/812345-el-gobierno".to_string(),
            source: "Página/12".to_string(),
        }
    }

    fn summary(label: &str, text: &str) -> ToneSummary {
        ToneSummary {
            tone: label.to_lowercase(),
            label: label.to_string(),
            text: text.to_string(),
            degraded: text == SUMMARY_UNAVAILABLE,
        }
    }

    #[test]
    fn test_render_layout() {
        let digest = assemble(
            &article(),
            &[
                summary("Libertario", "Menos impuestos."),
                summary("Neutral informativo", SUMMARY_UNAVAILABLE),
            ],
            4000,
        );
        assert_eq!(
            digest.text,
            "📰 *Página/12 - Comparativa de enfoques*\n\n\
             🗣 *Libertario*\nMenos impuestos.\n\n\
             🗣 *Neutral informativo*\n[No se pudo generar resumen]\n\n\
             🔗 https://www.pagina12.com.ar/812345-el-gobierno"
        );
        assert!(!digest.truncated);
        assert_eq!(digest.source, "Página/12");
    }

    #[test]
    fn test_truncates_long_render_with_marker() {
        let long = "a".repeat(5000);
        let digest = assemble(&article(), &[summary("Libertario", &long)], 4000);

        assert!(digest.truncated);
        assert!(digest.text.chars().count() <= 4000);
        assert!(digest.text.ends_with(TRUNCATION_MARKER));
        assert!(digest.text.starts_with("📰 *Página/12"));
    }

    #[test]
    fn test_exact_cap_is_untouched() {
        let text = "x".repeat(4000);
        assert_eq!(cap_length(text.clone(), 4000), (text, false));
    }

    #[test]
    fn test_cap_counts_characters() {
        let (text, truncated) = cap_length("ñ".repeat(100), 50);
        assert!(truncated);
        assert_eq!(text.chars().count(), 50);
        assert!(text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_tiny_cap() {
        let (text, truncated) = cap_length("x".repeat(100), 5);
        assert!(truncated);
        assert_eq!(text, "(mess");
    }

    #[test]
    fn test_cut_through_heading_keeps_bold_balanced() {
        // Slide the cut across the whole second heading.
        for filler in 3880..3940 {
            let digest = assemble(
                &article(),
                &[
                    summary("Libertario", &"a".repeat(filler)),
                    summary("Neutral informativo", &"b".repeat(500)),
                ],
                4000,
            );
            assert!(digest.truncated);
            assert!(digest.text.chars().count() <= 4000);
            assert!(digest.text.ends_with(TRUNCATION_MARKER));
            assert_eq!(
                digest.text.matches('*').count() % 2,
                0,
                "unbalanced bold with filler {filler}"
            );
        }
    }

    #[test]
    fn test_cut_through_summary_markup() {
        let body = format!(
            "{} _cursiva sin cerrar y `codigo {}",
            "a".repeat(60),
            "z".repeat(100)
        );
        let (text, truncated) = cap_length(format!("*Título*\n{body}"), 115);
        assert!(truncated);
        assert_eq!(text.matches('*').count(), 2);
        assert_eq!(text.matches('_').count(), 0);
        assert_eq!(text.matches('`').count(), 0);
        assert!(text.contains("a cursiva sin cerrar y co\n"));
        assert!(text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_paired_markup_survives_cut() {
        assert_eq!(balance_markup("*a* _b_ `c`"), "*a* _b_ `c`");
        assert_eq!(balance_markup("*a* *b"), "*a* b");
    }
}
