//! Sentence-aware splitting of article bodies into bounded chunks.
//!
//! While the remaining text is longer than `max_len` characters, the next
//! chunk ends at the last `.` within the first `max_len` characters, or is
//! hard-cut at `max_len` when there is none. Chunks are trimmed; nothing else
//! is dropped.

use crate::models::Chunk;
use crate::utils::{char_len, take_chars};

/// Split `text` into ordered chunks of at most `max_len` characters.
///
/// # Arguments
///
/// * `text` - The cleaned article body.
/// * `max_len` - Chunk ceiling in characters; zero is treated as one.
///
/// # Returns
///
/// The chunks in reading order, indexed from zero. Empty or whitespace-only
/// input yields no chunks.
pub fn chunk(text: &str, max_len: usize) -> Vec<Chunk> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while char_len(rest) > max_len {
        let window = take_chars(rest, max_len);
        let cut = match window.rfind('.') {
            Some(dot) => dot + 1,
            None => window.len(),
        };
        push(&mut chunks, &rest[..cut]);
        rest = rest[cut..].trim_start();
    }
    push(&mut chunks, rest);
    chunks
}

fn push(chunks: &mut Vec<Chunk>, segment: &str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        chunks.push(Chunk {
            index: chunks.len(),
            text: segment.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk("  Una sola oración.  ", 3000);
        assert_eq!(
            chunks,
            vec![Chunk {
                index: 0,
                text: "Una sola oración.".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk("", 3000).is_empty());
        assert!(chunk("   \n ", 3000).is_empty());
    }

    #[test]
    fn test_cuts_at_last_period_within_limit() {
        let chunks = chunk("Uno dos. Tres cuatro. Cinco seis siete.", 22);
        assert_eq!(texts(&chunks), vec!["Uno dos. Tres cuatro.", "Cinco seis siete."]);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_period_exactly_at_limit_is_kept() {
        let chunks = chunk("abcd. efgh", 5);
        assert_eq!(texts(&chunks), vec!["abcd.", "efgh"]);
    }

    #[test]
    fn test_hard_cut_without_terminator() {
        let chunks = chunk(&"x".repeat(25), 10);
        assert_eq!(texts(&chunks), vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_multibyte_text_respects_char_limit() {
        let text = "ñandú árbol canción. ".repeat(300);
        let chunks = chunk(&text, 100);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 100));
        assert!(chunks.iter().all(|c| c.text.ends_with('.')));
    }

    #[test]
    fn test_reconstructs_input_and_bounds_lengths() {
        let sentence = "El oficialismo consiguió los votos necesarios en la Cámara de Diputados. ";
        let text = format!(
            "{}{}{}",
            sentence.repeat(60),
            "z".repeat(3500),
            sentence.repeat(10)
        );
        let chunks = chunk(&text, 3000);

        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert!(c.text.chars().count() <= 3000);
        }

        let squash = |s: &str| s.split_whitespace().collect::<String>();
        assert_eq!(squash(&texts(&chunks).concat()), squash(&text));
    }
}
