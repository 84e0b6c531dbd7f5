//! Shared utilities

pub mod retry;

/// Return the longest prefix of `text` containing at most `max_chars`
/// characters, without splitting a UTF-8 code point.
#[must_use]
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_prefix_short_input() {
        assert_eq!(char_prefix("hello", 10), "hello");
    }

    #[test]
    fn test_char_prefix_truncates() {
        assert_eq!(char_prefix("hello world", 5), "hello");
    }

    #[test]
    fn test_char_prefix_multibyte() {
        // Must not split inside a multi-byte character
        assert_eq!(char_prefix("héllo", 2), "hé");
    }
}
