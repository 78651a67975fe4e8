//! Chat screen: header, transcript, input and status bar.

use crate::app::App;
use crate::screens::Screen;
use crate::text::{visual_width, wrap_text};
use crate::ui::chat_layout;
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, StatusBar};
use chatbox_engine::{Conversation, Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Indent in front of message bodies.
const INDENT: &str = "  ";

/// Body of the placeholder bubble shown while a reply is pending.
const LOADING: &str = "...";

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let layout = chat_layout(area);

        render_header(layout.header, buf);
        render_transcript(app, layout.transcript, buf);
        render_input(app, layout.input, buf);

        let hints = vec![
            KeyHint::new("Enter", "Send"),
            KeyHint::new("F1", "Help"),
            KeyHint::new("Esc", "Quit"),
        ];
        let right = if app.conversation.is_pending() {
            "Waiting for response..."
        } else {
            app.endpoint.as_str()
        };
        StatusBar::new("Chat")
            .hints(hints)
            .right(right)
            .render(layout.status, buf);
    }
}

/// Bordered block around the transcript.
pub fn transcript_block() -> Block<'static> {
    Block::default()
        .title(" Conversation ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default())
}

/// Lay out the whole conversation as display lines for the given width.
///
/// Messages are separated by a blank line. Each starts with its sender
/// label, followed by the indented, wrapped body. Replies end with their
/// elapsed time in parentheses. A pending exchange adds a trailing
/// assistant bubble with `...`.
pub fn transcript_lines(conversation: &Conversation, width: u16) -> Vec<Line<'static>> {
    let body_width = usize::from(width).saturating_sub(INDENT.len()).max(1);
    let mut lines = Vec::new();

    for message in conversation.log() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        push_message(&mut lines, message, body_width);
    }

    if conversation.is_pending() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(label_line(Sender::Assistant));
        lines.push(Line::from(vec![
            Span::styled(INDENT, Styles::default()),
            Span::styled(LOADING, Styles::dim()),
        ]));
    }

    lines
}

fn label_line(sender: Sender) -> Line<'static> {
    let style = match sender {
        Sender::User => Styles::user_label(),
        Sender::Assistant => Styles::assistant_label(),
    };
    Line::from(Span::styled(sender.label(), style))
}

fn push_message(lines: &mut Vec<Line<'static>>, message: &Message, body_width: usize) {
    lines.push(label_line(message.sender()));

    let body = wrap_text(message.text(), body_width);
    let annotation = message.elapsed_label().map(|label| format!("({label})"));
    let last = body.len().saturating_sub(1);
    let mut annotation_placed = annotation.is_none();

    for (i, text) in body.into_iter().enumerate() {
        let mut spans = vec![Span::styled(INDENT, Styles::default())];
        let text_width = visual_width(&text);
        let empty = text.is_empty();
        spans.push(Span::styled(text, Styles::default()));

        if i == last {
            if let Some(annotation) = &annotation {
                let gap = usize::from(!empty);
                if text_width + gap + visual_width(annotation) <= body_width {
                    if !empty {
                        spans.push(Span::styled(" ", Styles::default()));
                    }
                    spans.push(Span::styled(annotation.clone(), Styles::elapsed()));
                    annotation_placed = true;
                }
            }
        }
        lines.push(Line::from(spans));
    }

    if !annotation_placed {
        if let Some(annotation) = annotation {
            lines.push(Line::from(vec![
                Span::styled(INDENT, Styles::default()),
                Span::styled(annotation, Styles::elapsed()),
            ]));
        }
    }
}

fn render_header(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    Paragraph::new(Line::from(Span::styled("chatbox", Styles::title())))
        .alignment(Alignment::Center)
        .style(Styles::default())
        .render(inner, buf);
}

fn render_transcript(app: &App, area: Rect, buf: &mut Buffer) {
    let block = transcript_block();
    let inner = block.inner(area);
    block.render(area, buf);

    let conversation = &app.conversation;
    if conversation.log().is_empty() && !conversation.is_pending() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Type a message below and press Enter.",
                Styles::dim(),
            )),
        ])
        .style(Styles::default());
        hint.render(inner, buf);
        return;
    }

    let lines = transcript_lines(conversation, inner.width);
    let height = usize::from(inner.height);
    let bottom_start = lines.len().saturating_sub(height);
    let start = bottom_start.saturating_sub(app.scroll_back.min(bottom_start));

    let visible: Vec<Line<'_>> = lines.into_iter().skip(start).take(height).collect();
    Paragraph::new(visible)
        .style(Styles::default())
        .render(inner, buf);
}

fn render_input(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(" Message ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    app.input_state
        .widget()
        .block(block)
        .focused(!app.show_help)
        .placeholder("Type your message...")
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, line_to_string, render_screen_to_string};
    use insta::assert_snapshot;
    use std::time::Duration;

    fn reply(conversation: &mut Conversation, question: &str, answer: &str, ms: u64) {
        let exchange = conversation.submit(question).unwrap();
        conversation.complete_after(exchange, Ok(answer.into()), Duration::from_millis(ms));
    }

    fn transcript_text(conversation: &Conversation, width: u16) -> String {
        transcript_lines(conversation, width)
            .iter()
            .map(line_to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_transcript_after_exchanges() {
        let mut conversation = Conversation::new();
        reply(&mut conversation, "Hi there", "Hello", 2500);
        reply(&mut conversation, "And you?", "Fine, thanks.", 500);
        conversation.submit("Tell me about Redis").unwrap();

        assert_snapshot!("transcript_after_exchanges", transcript_text(&conversation, 30));
    }

    #[test]
    fn test_transcript_empty() {
        assert!(transcript_lines(&Conversation::new(), 30).is_empty());
    }

    #[test]
    fn test_pending_shows_loading_bubble() {
        let mut conversation = Conversation::new();
        conversation.submit("Hi").unwrap();

        let text = transcript_text(&conversation, 30);
        assert_eq!(text, "You\n  Hi\n\nAssistant\n  ...");
    }

    #[test]
    fn test_failed_exchange_shows_only_user_message() {
        let mut conversation = Conversation::new();
        let exchange = conversation.submit("Hi").unwrap();
        conversation.complete(
            exchange,
            Err(chatbox_engine::ClientError::Status {
                status: 500,
                body: String::new(),
            }),
        );

        assert_eq!(transcript_text(&conversation, 30), "You\n  Hi");
    }

    #[test]
    fn test_annotation_moves_to_own_line_when_narrow() {
        let mut conversation = Conversation::new();
        reply(&mut conversation, "Hi", "abcdefgh", 2500);

        let text = transcript_text(&conversation, 12);
        assert!(text.ends_with("Assistant\n  abcdefgh\n  (2.5s)"), "{text}");
    }

    #[test]
    fn test_long_reply_wraps_under_indent() {
        let mut conversation = Conversation::new();
        reply(&mut conversation, "Hi", "one two three four five six", 100);

        let lines = transcript_lines(&conversation, 14);
        for line in &lines {
            assert!(line.width() <= 14, "{line:?}");
        }
        let body: Vec<String> = lines.iter().skip(4).map(line_to_string).collect();
        assert!(body.iter().all(|l| l.starts_with("  ")));
        assert!(body.last().unwrap().ends_with("(100 ms)"));
    }

    #[test]
    fn test_screen_shows_hint_when_empty() {
        let app = create_test_app();
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("chatbox"));
        assert!(screen.contains("Conversation"));
        assert!(screen.contains("Type a message below and press Enter."));
        assert!(screen.contains("> _Type your message..."));
        assert!(screen.contains("http://localhost:8080"));
    }

    #[test]
    fn test_screen_pending_status() {
        let mut app = create_test_app();
        app.conversation.submit("Hi").unwrap();

        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("Waiting for response..."));
        assert!(screen.contains("..."));
        assert!(!screen.contains("Type a message below"));
    }

    #[test]
    fn test_screen_pins_latest_messages() {
        let mut app = create_test_app();
        for i in 0..20 {
            reply(&mut app.conversation, &format!("question {i}"), &format!("answer {i}"), 10);
        }

        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("answer 19"));
        assert!(!screen.contains("question 0"));
    }

    #[test]
    fn test_screen_scroll_back_reveals_older_messages() {
        let mut app = create_test_app();
        for i in 0..20 {
            reply(&mut app.conversation, &format!("question {i}"), &format!("answer {i}"), 10);
        }
        app.scroll_back = usize::MAX;

        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("question 0"));
        assert!(!screen.contains("answer 19"));
    }
}
