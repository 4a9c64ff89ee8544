//! String helpers shared across layers

/// Truncate a string to at most `max_chars` characters, appending an
/// ellipsis when anything was cut. Operates on char boundaries.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // Must not panic on non-ASCII boundaries
        let s = "日本語のテキスト";
        assert_eq!(truncate(s, 3), "日本語...");
    }
}
