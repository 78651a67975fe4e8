//! chatbox-engine: Headless exchange logic for the chatbox chat client
//!
//! This crate provides everything below the terminal UI:
//! - Messages and the append-only message log
//! - Conversation state (draft, pending flag) and the exchange lifecycle
//! - The HTTP client for the chat endpoint
//! - Configuration

pub mod client;
pub mod config;
pub mod conversation;
pub mod message;

// Re-export commonly used types
pub use client::{ChatClient, ClientError, HttpChatClient, CHAT_PATH, QUERY_PARAM};
pub use config::{Config, ConfigError, DEFAULT_BASE_URL};
pub use conversation::{Conversation, Exchange, ExchangeOutcome};
pub use message::{format_elapsed, Message, MessageLog, Sender};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
