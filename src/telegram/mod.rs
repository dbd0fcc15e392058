//! Telegram Bot API transport.
//!
//! [`ChatTransport`] is the outbound half (send text, send a document, reply),
//! [`UpdateSource`] the inbound half (long-polled updates). [`TelegramClient`]
//! implements both over HTTPS.

pub mod client;
pub mod types;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use client::TelegramClient;
pub use types::{InboundMessage, Update};

#[derive(Debug, Error)]
pub enum TelegramError {
    /// Text exceeds Telegram's per-message limit. Callers may fall back to a document.
    #[error("message is too long")]
    MessageTooLong,

    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send an HTML-formatted message. Returns the new message id.
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<i64, TelegramError>;

    /// Upload `content` as a file attachment. Returns the new message id.
    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Bytes,
        caption: &str,
    ) -> Result<i64, TelegramError>;

    /// Send plain text as a reply to `reply_to_message_id`.
    async fn reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        text: &str,
    ) -> Result<i64, TelegramError>;
}

#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch updates with an id at or above `offset`, waiting up to `timeout_secs`
    /// for at least one to arrive.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError>;
}
