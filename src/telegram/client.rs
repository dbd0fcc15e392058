//! HTTPS client for the Telegram Bot API.
//!
//! Only the handful of methods the relay needs: `getMe`, `sendMessage`,
//! `sendDocument` and `getUpdates`. Every call is attempted exactly once.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{ApiResponse, GetUpdates, Message, ReplyParameters, SendMessage, Update, User};
use super::{ChatTransport, TelegramError, UpdateSource};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra headroom on top of the long-poll timeout before the HTTP call gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

const TOO_LONG_MARKER: &str = "message is too long";

#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    /// `{api_url}/bot{token}`. Contains the bot token; never log it.
    base_url: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent("notebridge/0.1")
            .build()?;

        let api_url = api_url.trim_end_matches('/').to_string();
        let base_url = format!("{}/bot{}", api_url, token);

        Ok(Self {
            client,
            api_url,
            base_url,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Identify the bot. Used at startup to fail fast on a bad token.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.post_json("getMe", &serde_json::json!({}), SEND_TIMEOUT)
            .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_to_message_id: Option<i64>,
    ) -> Result<Message, TelegramError> {
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode,
            reply_parameters: reply_to_message_id.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
        };
        self.post_json("sendMessage", &payload, SEND_TIMEOUT).await
    }

    async fn post_json<B, T>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(strip_url)?;

        read_response(method, resp).await
    }
}

/// reqwest errors embed the request URL, which carries the bot token.
fn strip_url(e: reqwest::Error) -> TelegramError {
    TelegramError::Http(e.without_url())
}

async fn read_response<T: DeserializeOwned>(
    method: &str,
    resp: reqwest::Response,
) -> Result<T, TelegramError> {
    let status = resp.status();
    let raw = resp.bytes().await.map_err(strip_url)?;

    let envelope: ApiResponse<T> = match serde_json::from_slice(&raw) {
        Ok(env) => env,
        Err(e) => {
            tracing::warn!(method, status = %status, error = %e, "unparseable telegram response");
            return Err(TelegramError::Api {
                code: status.as_u16() as i64,
                description: String::from_utf8_lossy(&raw).into_owned(),
            });
        }
    };

    if envelope.ok {
        return envelope.result.ok_or_else(|| TelegramError::Api {
            code: status.as_u16() as i64,
            description: format!("{} returned ok without a result", method),
        });
    }

    let description = envelope.description.unwrap_or_default();
    if description.to_lowercase().contains(TOO_LONG_MARKER) {
        return Err(TelegramError::MessageTooLong);
    }

    Err(TelegramError::Api {
        code: envelope.error_code.unwrap_or(status.as_u16() as i64),
        description,
    })
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<i64, TelegramError> {
        let msg = self.send_message(chat_id, html, Some("HTML"), None).await?;
        Ok(msg.message_id)
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Bytes,
        caption: &str,
    ) -> Result<i64, TelegramError> {
        let len = content.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(reqwest::Body::from(content), len)
            .file_name(file_name.to_string())
            .mime_str("text/plain")
            .map_err(strip_url)?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let resp = self
            .client
            .post(self.method_url("sendDocument"))
            .timeout(SEND_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(strip_url)?;

        let msg: Message = read_response("sendDocument", resp).await?;
        Ok(msg.message_id)
    }

    async fn reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        text: &str,
    ) -> Result<i64, TelegramError> {
        let msg = self
            .send_message(chat_id, text, None, Some(reply_to_message_id))
            .await?;
        Ok(msg.message_id)
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let payload = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.post_json(
            "getUpdates",
            &payload,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }
}
