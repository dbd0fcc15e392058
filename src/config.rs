use std::fmt;
use std::time::Duration;

use anyhow::Context;

/// Default reviewer response window, in seconds.
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub struct Config {
    pub telegram_bot_token: String,
    /// Chat that receives release notes when a request omits `chat_id`.
    pub default_chat_id: i64,
    pub telegram_api_url: String,
    pub deepl_api_key: String,
    /// Explicit DeepL endpoint. When unset the endpoint is derived from the key.
    pub deepl_api_url: Option<String>,
    /// How long a release notes request waits for the reviewer.
    /// Set via TRANSLATION_TIMEOUT (seconds). Default: 600.
    pub reply_timeout: Duration,
    /// Browser origins allowed to call the API, besides localhost.
    /// Comma-separated list in NOTEBRIDGE_CORS_ORIGINS.
    pub cors_origins: Vec<String>,
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"****")
            .field("default_chat_id", &self.default_chat_id)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("deepl_api_key", &"****")
            .field("deepl_api_url", &self.deepl_api_url)
            .field("reply_timeout", &self.reply_timeout)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// Read `.env.local`, then `.env`, into the process environment.
///
/// Neither file overrides variables that are already set, so the real
/// environment always wins, and `.env.local` wins over `.env`.
pub fn load_env_files() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
}

/// Load configuration from the process environment.
pub fn load() -> anyhow::Result<Config> {
    load_env_files();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a [`Config`] from an arbitrary variable source.
pub fn from_lookup<F>(get: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| -> anyhow::Result<String> {
        get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .with_context(|| format!("{} must be set", key))
    };

    let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
    let default_chat_id = required("TELEGRAM_CHAT_ID")?
        .parse::<i64>()
        .context("TELEGRAM_CHAT_ID must be an integer chat id")?;
    let deepl_api_key = required("DEEPL_API_KEY")?;

    let telegram_api_url = get("TELEGRAM_API_URL")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.into());
    url::Url::parse(&telegram_api_url).context("TELEGRAM_API_URL is not a valid URL")?;

    let deepl_api_url = get("DEEPL_API_URL").filter(|v| !v.trim().is_empty());
    if let Some(ref u) = deepl_api_url {
        url::Url::parse(u).context("DEEPL_API_URL is not a valid URL")?;
    }

    let reply_timeout_secs = get("TRANSLATION_TIMEOUT")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_REPLY_TIMEOUT_SECS);

    Ok(Config {
        telegram_bot_token,
        default_chat_id,
        telegram_api_url,
        deepl_api_key,
        deepl_api_url,
        reply_timeout: Duration::from_secs(reply_timeout_secs),
        cors_origins: get("NOTEBRIDGE_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    })
}
