//! Status bar widget.

use crate::text::{truncate_to_width, visual_width};
use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

/// A key hint for the status bar.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar widget displayed at the bottom of the screen.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
        }
    }

    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text (truncated to whatever room the hints leave).
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        for x in area.x..area.x.saturating_add(area.width) {
            buf[(x, area.y)].set_char(' ').set_bg(Palette::STATUS_BG);
        }

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Styles::default().bg(Palette::USER).fg(Palette::BG),
            ),
            Span::styled(" ", Styles::status_bar()),
        ];
        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
            spans.push(Span::styled(format!(" {} ", hint.label), Styles::key_label()));
        }

        let left_line = Line::from(spans);
        let left_width = left_line.width() as u16;
        buf.set_line(area.x, area.y, &left_line, area.width);

        if let Some(text) = self.right_text {
            let room = area.width.saturating_sub(left_width).saturating_sub(2) as usize;
            let text = truncate_to_width(text, room);
            let text_width = visual_width(&text) as u16;
            if text_width > 0 {
                let x = area.x + area.width - text_width - 1;
                buf.set_string(x, area.y, &text, Styles::status_bar());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn render(bar: StatusBar<'_>, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn test_status_bar_mode_and_hints() {
        let bar = StatusBar::new("Chat").hints(vec![KeyHint::new("Enter", "Send")]);
        assert_eq!(render(bar, 40), " Chat   Enter  Send");
    }

    #[test]
    fn test_status_bar_right_text() {
        let bar = StatusBar::new("Chat").right("localhost");
        let line = render(bar, 40);
        assert!(line.ends_with("localhost"));
        assert!(line.starts_with(" Chat"));
    }

    #[test]
    fn test_status_bar_right_text_truncated() {
        let bar = StatusBar::new("Chat").right("http://localhost:8080");
        let line = render(bar, 20);
        assert!(line.contains("..."));
        assert!(!line.contains("8080"));
    }
}
