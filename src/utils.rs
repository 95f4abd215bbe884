//! Small string helpers shared by the extractor, chunker and digest assembler.
//!
//! Lengths are counted in characters, not bytes: article bodies are Spanish
//! text and every cut must land on a char boundary.

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped characters appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let len = char_len(s);
    if len <= max {
        s.to_string()
    } else {
        format!("{}…(+{} chars)", take_chars(s, max), len - max)
    }
}

/// Capitalize the first character of a string, leaving the rest untouched.
///
/// Used for tone headings ("libertario" -> "Libertario").
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Collapse every whitespace run into a single space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The longest prefix of `s` holding at most `n` characters.
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "ñ".repeat(20);
        assert_eq!(truncate_for_log(&s, 3), "ñññ…(+17 chars)");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("libertario"), "Libertario");
        assert_eq!(upcase("crítico al neoliberalismo"), "Crítico al neoliberalismo");
        assert_eq!(upcase(""), "");
        assert_eq!(upcase("ñ"), "Ñ");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c  "), "a b c");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("Página/12", 4), "Pági");
        assert_eq!(take_chars("abc", 10), "abc");
        assert_eq!(take_chars("abc", 0), "");
    }
}
