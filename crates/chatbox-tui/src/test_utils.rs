//! Test utilities for chatbox-tui rendering and event tests.
//!
//! Provides a scripted chat client, app constructors and helpers that turn
//! rendered buffers into strings for assertions and snapshots.

use crate::app::App;
use crate::screens::Screen as ScreenTrait;
use async_trait::async_trait;
use chatbox_engine::{ChatClient, ClientError, Config};
use ratatui::{buffer::Buffer, layout::Rect, text::Line};
use std::sync::Arc;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// How a [`FakeClient`] answers.
enum Script {
    Reply(String),
    Fail,
    Hang,
    Panic,
}

/// Chat client with a fixed answer.
pub struct FakeClient {
    script: Script,
}

impl FakeClient {
    /// Answer every message with `text`.
    pub fn replying(text: &str) -> Self {
        Self {
            script: Script::Reply(text.to_string()),
        }
    }

    /// Fail every message with a server error.
    pub fn failing() -> Self {
        Self {
            script: Script::Fail,
        }
    }

    /// Panic inside the request task.
    pub fn panicking() -> Self {
        Self {
            script: Script::Panic,
        }
    }

    /// Never answer.
    pub fn hanging() -> Self {
        Self {
            script: Script::Hang,
        }
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn send(&self, _query: &str) -> Result<String, ClientError> {
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail => Err(ClientError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            }),
            Script::Hang => std::future::pending().await,
            Script::Panic => panic!("chat client failed unexpectedly"),
        }
    }
}

/// Create a test app with the default config and a client that answers "Hello".
pub fn create_test_app() -> App {
    create_test_app_with_client(FakeClient::replying("Hello"))
}

/// Create a test app backed by the given client.
pub fn create_test_app_with_client(client: FakeClient) -> App {
    App::new(Arc::new(client), &Config::default())
}

/// Convert a buffer to a string representation for snapshot testing.
///
/// Trailing spaces are trimmed from every row.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Concatenate the spans of a line.
pub fn line_to_string(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen to a buffer and return it as a string with custom dimensions.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert!(app.conversation.log().is_empty());
        assert!(!app.conversation.is_pending());
        assert_eq!(app.endpoint, chatbox_engine::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }

    #[test]
    fn test_line_to_string() {
        let line = Line::from(vec![Span::raw("  "), Span::raw("Hi"), Span::raw(" (1s)")]);
        assert_eq!(line_to_string(&line), "  Hi (1s)");
    }

    #[tokio::test]
    async fn test_fake_client_scripts() {
        assert_eq!(FakeClient::replying("x").send("q").await.unwrap(), "x");
        assert!(FakeClient::failing().send("q").await.is_err());
    }
}
