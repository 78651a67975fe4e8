//! Outbound chat requests.
//!
//! The backend exposes a single `GET /ai/chat/string?query=<message>`
//! route that answers with a plain-text body. [`ChatClient`] is the seam
//! the conversation talks to; [`HttpChatClient`] is the real transport.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

/// Route of the chat endpoint, relative to the base URL.
pub const CHAT_PATH: &str = "/ai/chat/string";

/// Name of the query parameter carrying the user's message.
pub const QUERY_PARAM: &str = "query";

/// Something that can answer a chat message with text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one message and return the raw reply.
    async fn send(&self, query: &str) -> Result<String, ClientError>;
}

/// HTTP implementation of [`ChatClient`].
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    http: Client,
    base_url: String,
    encode_query: bool,
}

impl HttpChatClient {
    /// Create a client for the given base URL (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            encode_query: false,
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url).encode_query(config.encode_query)
    }

    /// Percent-encode the message instead of appending it as typed.
    #[must_use]
    pub fn encode_query(mut self, encode: bool) -> Self {
        self.encode_query = encode;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request URL for a message.
    ///
    /// In raw mode characters like `&` and `#` keep their URL meaning, so
    /// `a&b` reaches the server as `query=a` plus a stray `b` parameter.
    pub fn request_url(&self, query: &str) -> Result<Url, ClientError> {
        let endpoint = format!("{}{CHAT_PATH}", self.base_url);
        if self.encode_query {
            let mut url = Url::parse(&endpoint).map_err(|e| ClientError::InvalidUrl {
                url: endpoint.clone(),
                reason: e.to_string(),
            })?;
            url.query_pairs_mut().append_pair(QUERY_PARAM, query);
            Ok(url)
        } else {
            let raw = format!("{endpoint}?{QUERY_PARAM}={query}");
            Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
                url: raw.clone(),
                reason: e.to_string(),
            })
        }
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, query: &str) -> Result<String, ClientError> {
        let url = self.request_url(query)?;
        debug!(%url, "sending chat request");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

/// Errors that can occur while talking to the chat endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL and message did not form a valid URL.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network or protocol failure.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}
