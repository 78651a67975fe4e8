//! Application state and update logic for the chatbox TUI.

use crate::event::{key_to_action, Action};
use crate::screens::chat::{transcript_block, transcript_lines};
use crate::ui::chat_layout;
use crate::ui::widgets::TextInputState;
use chatbox_engine::{ChatClient, ClientError, Config, Conversation, Exchange};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::error;

/// A request running on its own task, yielding what `complete_after` needs.
type ExchangeTask = JoinHandle<(Exchange, Result<String, ClientError>, Duration)>;

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Message log, draft and pending flag.
    pub conversation: Conversation,

    /// Text input state for the message input.
    pub input_state: TextInputState,

    /// Lines scrolled up from the bottom of the transcript (0 = pinned).
    pub scroll_back: usize,

    /// Backend the client talks to, shown in the status bar.
    pub endpoint: String,

    /// Conversation revision the scroll position last followed.
    followed_revision: u64,

    /// Inner area of the transcript pane at the last draw.
    transcript_area: Rect,

    client: Arc<dyn ChatClient>,

    /// Requests still in flight.
    exchanges: Vec<ExchangeTask>,
}

impl App {
    /// Create a new app instance.
    pub fn new(client: Arc<dyn ChatClient>, config: &Config) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            conversation: Conversation::new().block_while_pending(config.block_while_pending),
            input_state: TextInputState::new(),
            scroll_back: 0,
            endpoint: config.base_url.clone(),
            followed_revision: 0,
            transcript_area: Rect::default(),
            client,
            exchanges: Vec::new(),
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.show_help && self.handle_input_key(key) {
            self.conversation.update_draft(self.input_state.content());
            return;
        }
        self.handle_action(key_to_action(key));
    }

    /// Apply editing keys to the input.
    /// Returns true if the key was handled (should not be processed as action).
    fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match key.code {
            KeyCode::Char(c) => self.input_state.insert(c),
            KeyCode::Backspace => self.input_state.backspace(),
            KeyCode::Delete => self.input_state.delete(),
            KeyCode::Left => self.input_state.move_left(),
            KeyCode::Right => self.input_state.move_right(),
            KeyCode::Home => self.input_state.move_home(),
            KeyCode::End => self.input_state.move_end(),
            KeyCode::Up => {
                // History only from an empty input; otherwise Up scrolls
                if self.input_state.is_empty() || self.input_state.is_browsing_history() {
                    self.input_state.history_prev();
                }
                return self.input_state.is_browsing_history();
            }
            KeyCode::Down => {
                if !self.input_state.is_browsing_history() {
                    return false;
                }
                self.input_state.history_next();
            }
            _ => return false,
        }
        true
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Global actions
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match action {
            Action::Back => {
                if self.input_state.is_empty() {
                    self.should_quit = true;
                } else {
                    self.input_state.clear();
                    self.conversation.update_draft("");
                }
            }
            Action::Submit => self.submit(),
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::PageUp => self.scroll_up(self.page_size()),
            Action::PageDown => self.scroll_down(self.page_size()),
            Action::Quit | Action::Help | Action::None => {}
        }
    }

    /// Handle a mouse event.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.handle_action(Action::ScrollUp),
            MouseEventKind::ScrollDown => self.handle_action(Action::ScrollDown),
            _ => {}
        }
    }

    /// Insert pasted text into the input.
    ///
    /// The input is a single line, so line breaks become spaces.
    pub fn handle_paste(&mut self, text: &str) {
        if self.show_help {
            return;
        }
        let line: String = text
            .chars()
            .filter(|&c| c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        self.input_state.insert_str(&line);
        self.conversation.update_draft(self.input_state.content());
    }

    /// Submit the draft and start its request on a background task.
    ///
    /// Nothing is sent when the conversation refuses the draft (blank text,
    /// or a pending exchange with `block_while_pending` set).
    fn submit(&mut self) {
        let Some(exchange) = self.conversation.submit_draft() else {
            return;
        };
        self.input_state.submit();

        let client = Arc::clone(&self.client);
        let handle = tokio::spawn(async move {
            let result = client.send(exchange.query()).await;
            let elapsed = exchange.started().elapsed();
            (exchange, result, elapsed)
        });
        self.exchanges.push(handle);
        self.follow_changes();
    }

    /// Fold finished requests back into the conversation (non-blocking).
    pub async fn collect_finished_exchanges(&mut self) {
        let mut completed = Vec::new();
        for (i, handle) in self.exchanges.iter().enumerate() {
            if handle.is_finished() {
                completed.push(i);
            }
        }
        // Completion order follows submission order among finished tasks
        let mut finished = Vec::with_capacity(completed.len());
        for i in completed.into_iter().rev() {
            finished.push(self.exchanges.remove(i));
        }
        for handle in finished.into_iter().rev() {
            match handle.await {
                Ok((exchange, result, elapsed)) => {
                    self.conversation.complete_after(exchange, result, elapsed);
                }
                Err(e) => {
                    error!(error = %e, "exchange task failed");
                    self.conversation.abandon();
                }
            }
        }
        self.follow_changes();
    }

    /// Number of requests still in flight.
    pub fn in_flight(&self) -> usize {
        self.exchanges.len()
    }

    /// Abort any requests still in flight.
    pub fn abort_exchanges(&mut self) {
        for handle in self.exchanges.drain(..) {
            handle.abort();
        }
    }

    /// Record the terminal size the next frame is drawn at.
    pub fn set_viewport(&mut self, area: Rect) {
        self.transcript_area = transcript_block().inner(chat_layout(area).transcript);
        self.scroll_back = self.scroll_back.min(self.max_scroll());
        self.follow_changes();
    }

    /// Jump back to the bottom whenever the log or pending flag changed.
    fn follow_changes(&mut self) {
        let revision = self.conversation.revision();
        if revision != self.followed_revision {
            self.followed_revision = revision;
            self.scroll_back = 0;
        }
    }

    fn page_size(&self) -> usize {
        usize::from(self.transcript_area.height).max(1)
    }

    fn max_scroll(&self) -> usize {
        let lines = transcript_lines(&self.conversation, self.transcript_area.width).len();
        lines.saturating_sub(usize::from(self.transcript_area.height))
    }

    fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = (self.scroll_back + lines).min(self.max_scroll());
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }
}
