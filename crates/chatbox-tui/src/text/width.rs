//! Cell-width measuring and truncation.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width of a string in terminal cells.
///
/// Wide characters (CJK, most emoji) count as two cells.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut a string down to at most `max_width` cells, marking the cut with `...`.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visual_width(s) <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(3);
    if budget == 0 {
        return "...".chars().take(max_width).collect();
    }

    let mut result = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        result.push(ch);
        used += w;
    }
    result.push_str("...");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_width() {
        assert_eq!(visual_width("hello"), 5);
        assert_eq!(visual_width(""), 0);
        assert_eq!(visual_width("你好"), 4);
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("http://localhost:8080", 30), "http://localhost:8080");
    }

    #[test]
    fn test_truncate_cuts() {
        assert_eq!(truncate_to_width("http://localhost:8080", 10), "http://...");
    }

    #[test]
    fn test_truncate_wide_chars_not_split() {
        assert_eq!(truncate_to_width("你好世界", 6), "你...");
    }

    #[test]
    fn test_truncate_tiny_width() {
        assert_eq!(truncate_to_width("hello", 3), "...");
        assert_eq!(truncate_to_width("hello", 2), "..");
        assert_eq!(truncate_to_width("hello", 0), "");
    }
}
