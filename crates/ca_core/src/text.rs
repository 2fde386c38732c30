/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prefix of `s` holding at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_joins_lines() {
        assert_eq!(collapse_whitespace("  Post-UTME\n\n  screening \t begins "), "Post-UTME screening begins");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn truncate_chars_respects_multibyte_text() {
        assert_eq!(truncate_chars("\u{00C8}k\u{00F3} Atlantic", 3), "\u{00C8}k\u{00F3}");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
