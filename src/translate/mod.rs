pub mod deepl;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    /// The translation API answered with a non-success status.
    #[error("{status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response contained no translations")]
    Empty,
}

/// Machine translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (an ISO code such as "de").
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslationError>;
}
