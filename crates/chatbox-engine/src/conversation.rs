//! Conversation state: message log, draft and pending flag.
//!
//! One [`Conversation`] backs one chat view. An exchange is split in two
//! halves so the caller decides where the request runs:
//!
//! 1. [`Conversation::submit`] appends the user message and hands back an
//!    [`Exchange`] ticket.
//! 2. [`Conversation::complete`] folds the reply (or failure) back in.
//!
//! [`Conversation::exchange`] does both around a [`ChatClient`] call.

use crate::client::{ChatClient, ClientError};
use crate::message::{Message, MessageLog};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// A submitted message waiting for its reply.
#[derive(Debug)]
pub struct Exchange {
    query: String,
    started: Instant,
}

impl Exchange {
    /// Text to send to the chat endpoint.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// When the exchange was submitted.
    pub fn started(&self) -> Instant {
        self.started
    }
}

/// How an exchange ended.
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// An assistant message was appended.
    Replied { elapsed_ms: u64 },
    /// The request failed; nothing was appended.
    Failed(ClientError),
}

impl ExchangeOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, Self::Replied { .. })
    }
}

/// State of one chat view.
#[derive(Debug, Default)]
pub struct Conversation {
    log: MessageLog,
    draft: String,
    pending: bool,
    block_while_pending: bool,
    revision: u64,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore submissions while an exchange is pending.
    #[must_use]
    pub fn block_while_pending(mut self, block: bool) -> Self {
        self.block_while_pending = block;
        self
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether a reply is still outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Counter bumped whenever the log or the pending flag changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the draft verbatim.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Submit a message.
    ///
    /// Blank text (empty or whitespace only) is ignored and yields `None`.
    /// Otherwise the text is appended verbatim as a user message, the
    /// draft is cleared and the conversation becomes pending.
    pub fn submit(&mut self, text: impl Into<String>) -> Option<Exchange> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        if self.pending && self.block_while_pending {
            debug!("submission ignored, exchange still pending");
            return None;
        }

        self.log.push(Message::user(text.clone()));
        self.draft.clear();
        self.pending = true;
        self.revision += 1;
        debug!(len = text.len(), "exchange submitted");

        Some(Exchange {
            query: text,
            started: Instant::now(),
        })
    }

    /// Submit the current draft.
    pub fn submit_draft(&mut self) -> Option<Exchange> {
        let text = self.draft.clone();
        self.submit(text)
    }

    /// Record the result of an exchange.
    ///
    /// A reply is appended as an assistant message stamped with the time
    /// since submission. A failure is logged and appends nothing. Either
    /// way the conversation stops being pending.
    pub fn complete(
        &mut self,
        exchange: Exchange,
        result: Result<String, ClientError>,
    ) -> ExchangeOutcome {
        let elapsed = exchange.started.elapsed();
        self.complete_after(exchange, result, elapsed)
    }

    /// Record the result of an exchange whose round trip was timed by the caller.
    ///
    /// Used when the request runs on another task and the reply is folded
    /// in later: the elapsed time should stop when the reply arrived, not
    /// when it was collected.
    pub fn complete_after(
        &mut self,
        exchange: Exchange,
        result: Result<String, ClientError>,
        elapsed: Duration,
    ) -> ExchangeOutcome {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.pending = false;
        self.revision += 1;

        match result {
            Ok(reply) => {
                debug!(elapsed_ms, query = %exchange.query, "exchange replied");
                self.log.push(Message::assistant(reply, elapsed_ms));
                ExchangeOutcome::Replied { elapsed_ms }
            }
            Err(e) => {
                error!(error = %e, elapsed_ms, query = %exchange.query, "Error fetching AI response");
                ExchangeOutcome::Failed(e)
            }
        }
    }

    /// Stop waiting for an exchange whose result was lost.
    ///
    /// Nothing is appended; the conversation stops being pending so the
    /// loading indicator does not stay up forever.
    pub fn abandon(&mut self) {
        self.pending = false;
        self.revision += 1;
    }

    /// Submit the draft and wait for the client's reply.
    ///
    /// Returns `None` when the draft was not submittable.
    pub async fn exchange(&mut self, client: &dyn ChatClient) -> Option<ExchangeOutcome> {
        let exchange = self.submit_draft()?;
        let result = client.send(exchange.query()).await;
        Some(self.complete(exchange, result))
    }
}
