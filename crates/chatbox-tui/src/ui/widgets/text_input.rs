//! Single-line text input widget.

use crate::text::visual_width;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Renders a [`TextInputState`] with a prompt, a cursor and a placeholder.
///
/// When the content is wider than the area, the view scrolls so the cursor
/// stays visible.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    state: &'a TextInputState,
    block: Option<Block<'a>>,
    focused: bool,
    placeholder: Option<&'a str>,
    prompt: &'a str,
}

impl<'a> TextInput<'a> {
    pub fn new(state: &'a TextInputState) -> Self {
        Self {
            state,
            block: None,
            focused: true,
            placeholder: None,
            prompt: "> ",
        }
    }

    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let mut spans = vec![Span::styled(self.prompt, Styles::user_label())];

        if self.state.is_empty() {
            if self.focused {
                spans.push(Span::styled("_", Styles::user_label()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        let (before, after) = self.state.split_at_cursor();
        let cursor = if !self.focused {
            ""
        } else if after.is_empty() {
            "_"
        } else {
            "|"
        };

        // Drop leading characters until prompt, text before the cursor and
        // the cursor itself fit on the line.
        let available = usize::from(inner.width);
        let fixed = visual_width(self.prompt) + visual_width(cursor);
        let mut before_width = visual_width(before);
        let mut start = 0;
        for ch in before.chars() {
            if fixed + before_width <= available {
                break;
            }
            before_width -= ch.width().unwrap_or(0);
            start += ch.len_utf8();
        }

        spans.push(Span::styled(&before[start..], Styles::default()));
        spans.push(Span::styled(cursor, Styles::user_label()));
        spans.push(Span::styled(after, Styles::default()));
        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

/// Content, cursor and submit history of a text input.
///
/// The cursor is a character index, so multi-byte input is safe to edit.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    history: Vec<String>,
    /// Position while browsing history (`None` = editing live input).
    history_index: Option<usize>,
    /// Live input stashed while browsing history.
    saved_input: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    /// Content before and after the cursor.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.content.split_at(self.byte_index(self.cursor))
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Take the content, recording it in history, and clear the input.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Clear the input without recording it in history.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.history_index = None;
        self.saved_input.clear();
    }

    /// Whether a history entry is currently shown instead of live input.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    /// Step back to an older history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let next = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return,
        };
        self.history_index = Some(next);
        self.content = self.history[self.history.len() - 1 - next].clone();
        self.move_end();
    }

    /// Step forward to a newer history entry, ending at the stashed live input.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => return,
            Some(0) => {
                self.history_index = None;
                self.content = std::mem::take(&mut self.saved_input);
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.content = self.history[self.history.len() - i].clone();
            }
        }
        self.move_end();
    }

    /// Create a widget rendering this state.
    pub fn widget(&self) -> TextInput<'_> {
        TextInput::new(self)
    }
}
