//! Fakes shared by the integration tests: a scripted translator and an
//! in-memory chat transport that records everything the relay sends.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use bytes::Bytes;

use notebridge::config::Config;
use notebridge::telegram::{ChatTransport, TelegramError};
use notebridge::translate::{TranslationError, Translator};
use notebridge::AppState;

pub const DEFAULT_CHAT: i64 = -100_500;

/// Telegram's limit for a single text message.
pub const TELEGRAM_TEXT_LIMIT: usize = 4096;

pub enum FakeTranslator {
    Returns(String),
    Fails { status: u16, body: String },
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(
        &self,
        _text: &str,
        _target_language: &str,
    ) -> Result<String, TranslationError> {
        match self {
            FakeTranslator::Returns(t) => Ok(t.clone()),
            FakeTranslator::Fails { status, body } => Err(TranslationError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sent {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SentDocument {
    pub chat_id: i64,
    pub message_id: i64,
    pub file_name: String,
    pub content: String,
    pub caption: String,
}

#[derive(Debug, Clone)]
pub struct SentReply {
    pub chat_id: i64,
    pub reply_to: i64,
    pub text: String,
}

pub struct FakeTransport {
    next_id: AtomicI64,
    /// When set, every outbound send fails with this API error description.
    pub fail_with: Option<String>,
    pub html: Mutex<Vec<Sent>>,
    pub documents: Mutex<Vec<SentDocument>>,
    pub replies: Mutex<Vec<SentReply>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            fail_with: None,
            html: Mutex::new(Vec::new()),
            documents: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(description: &str) -> Self {
        Self {
            fail_with: Some(description.to_string()),
            ..Self::new()
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), TelegramError> {
        match &self.fail_with {
            Some(description) => Err(TelegramError::Api {
                code: 400,
                description: description.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn html(&self) -> Vec<Sent> {
        self.html.lock().unwrap().clone()
    }

    pub fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<i64, TelegramError> {
        self.check_failure()?;
        if html.chars().count() > TELEGRAM_TEXT_LIMIT {
            return Err(TelegramError::MessageTooLong);
        }
        let message_id = self.next_id();
        self.html.lock().unwrap().push(Sent {
            chat_id,
            message_id,
            text: html.to_string(),
        });
        Ok(message_id)
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Bytes,
        caption: &str,
    ) -> Result<i64, TelegramError> {
        self.check_failure()?;
        let message_id = self.next_id();
        self.documents.lock().unwrap().push(SentDocument {
            chat_id,
            message_id,
            file_name: file_name.to_string(),
            content: String::from_utf8_lossy(&content).into_owned(),
            caption: caption.to_string(),
        });
        Ok(message_id)
    }

    async fn reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        text: &str,
    ) -> Result<i64, TelegramError> {
        self.replies.lock().unwrap().push(SentReply {
            chat_id,
            reply_to: reply_to_message_id,
            text: text.to_string(),
        });
        Ok(self.next_id())
    }
}

pub fn test_config(reply_timeout: Duration) -> Config {
    Config {
        telegram_bot_token: "123:test".into(),
        default_chat_id: DEFAULT_CHAT,
        telegram_api_url: "http://127.0.0.1:9".into(),
        deepl_api_key: "deepl-test".into(),
        deepl_api_url: None,
        reply_timeout,
        cors_origins: vec!["https://ci.example.com".into()],
    }
}

pub fn state(
    translator: FakeTranslator,
    transport: Arc<FakeTransport>,
    reply_timeout: Duration,
) -> Arc<AppState> {
    Arc::new(AppState::new(
        test_config(reply_timeout),
        Arc::new(translator),
        transport,
    ))
}

/// Wait until a request has registered its pending reply for `chat_id`.
pub async fn wait_for_pending(state: &AppState, chat_id: i64) -> i64 {
    for _ in 0..400 {
        if let Some(id) = state.pending.outbound_message_id(chat_id) {
            return id;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no pending reply registered for chat {}", chat_id);
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
