//! Wrapping of message bodies.

/// Wrap text to the given width, keeping the author's line breaks.
///
/// Every `\n` in the input starts a new output line, and blank lines are
/// kept as empty strings. Long lines break at word boundaries, or mid-word
/// when a single word exceeds the width.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for source_line in text.split('\n') {
        if source_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(source_line, width)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::visual_width;

    #[test]
    fn test_wrap_text_short() {
        assert_eq!(wrap_text("Hello", 10), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_text_breaks_at_words() {
        let text = "Hello world this is a long line";
        let lines = wrap_text(text, 10);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(visual_width(line) <= 10);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_keeps_line_breaks() {
        let lines = wrap_text("first\n\nthird", 20);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_wrap_text_long_word() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_wide_chars_fit() {
        let lines = wrap_text("你好 世界 你好 世界", 6);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(visual_width(line) <= 6);
        }
    }

    #[test]
    fn test_wrap_text_zero_width() {
        assert_eq!(wrap_text("a\nb", 0), vec!["a", "b"]);
    }
}
