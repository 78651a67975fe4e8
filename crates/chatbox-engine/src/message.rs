//! Messages exchanged in a conversation.
//!
//! A [`Message`] is immutable once it has been appended to a
//! [`MessageLog`]: fields are only readable, and the log itself only
//! grows at the end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the user.
    User,
    /// Returned by the chat endpoint.
    Assistant,
}

impl Sender {
    /// Display label used in the transcript.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

/// A single message in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    text: String,
    sender: Sender,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<u64>,
}

impl Message {
    /// Create a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            created_at: Utc::now(),
            elapsed_ms: None,
        }
    }

    /// Create an assistant message carrying the round-trip time of its exchange.
    pub fn assistant(text: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            created_at: Utc::now(),
            elapsed_ms: Some(elapsed_ms),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Milliseconds between submission and response (assistant messages only).
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.elapsed_ms
    }

    /// Formatted elapsed time, e.g. `"500 ms"` or `"2.5s"`.
    ///
    /// `None` for user messages and for replies timed at 0 ms.
    pub fn elapsed_label(&self) -> Option<String> {
        self.elapsed_ms.filter(|&ms| ms > 0).map(format_elapsed)
    }
}

/// Format an elapsed duration for display.
///
/// Under a second renders as whole milliseconds (`"500 ms"`), anything
/// longer as seconds with one decimal, halves rounded up (`"1.3s"` for
/// 1250 ms).
pub fn format_elapsed(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms} ms")
    } else {
        let tenths = ms / 100 + u64::from(ms % 100 >= 50);
        format!("{}.{}s", tenths / 10, tenths % 10)
    }
}

/// Append-only, insertion-ordered sequence of messages.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
