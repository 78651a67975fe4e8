//! chatbox-tui: Terminal UI for the chatbox chat client
//!
//! This crate provides the terminal layer for chatbox, including:
//! - The chat screen (header, transcript, input, status bar)
//! - Key and mouse handling that drives a [`chatbox_engine::Conversation`]
//! - The event loop that runs exchanges on background tasks

mod app;
mod event;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::App;
pub use chatbox_engine;
pub use event::{Action, Event, EventHandler};

use chatbox_engine::{ChatClient, Config};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::debug;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    config: &Config,
    client: Arc<dyn ChatClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, config);
    let mut events = EventHandler::new(config.tick_rate_ms);
    debug!(endpoint = %config.base_url, "chat view opened");

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            app.set_viewport(area);
            let buf = frame.buffer_mut();

            screens::chat::ChatScreen.render(app, area, buf);

            if app.show_help {
                screens::render_help_overlay(area, buf);
            }
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Paste(text) => app.handle_paste(&text),
                // Redrawn at the top of the loop
                Event::Tick | Event::Resize(_, _) => {}
            }
        }

        app.collect_finished_exchanges().await;

        if app.should_quit {
            if app.in_flight() > 0 {
                debug!(in_flight = app.in_flight(), "aborting unanswered exchanges");
            }
            app.abort_exchanges();
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}


/// Rendering tests that drive the app through key events.
#[cfg(test)]
mod flow_tests {
    use crate::screens::chat::ChatScreen;
    use crate::test_utils::{create_test_app, render_screen_to_string};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_exchange_round_trip_renders_reply() {
        let mut app = create_test_app();
        for c in "Hi".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("> Hi_"));

        app.handle_key(key(KeyCode::Enter));
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("Waiting for response..."));
        assert!(screen.contains("> _Type your message..."));

        tokio::time::timeout(Duration::from_secs(5), async {
            while app.in_flight() > 0 {
                tokio::task::yield_now().await;
                app.collect_finished_exchanges().await;
            }
        })
        .await
        .unwrap();

        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("Assistant"));
        assert!(screen.contains("  Hello"));
        assert!(!screen.contains("Waiting for response..."));
    }
}
