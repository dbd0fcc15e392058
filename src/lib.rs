//! notebridge: release notes translation relay.
//!
//! A CI job posts release notes over HTTP; the relay translates them with
//! DeepL, sends original and translation to a Telegram chat, and answers the
//! CI job with whatever the reviewer sends back as a reply.

use std::sync::Arc;

pub mod api;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod errors;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod relay;
pub mod telegram;
pub mod translate;

use correlation::PendingReplies;
use middleware::metrics::PrometheusRecorder;
use telegram::ChatTransport;
use translate::Translator;

/// Shared application state passed to handlers and the update poller.
pub struct AppState {
    pub config: config::Config,
    pub translator: Arc<dyn Translator>,
    pub transport: Arc<dyn ChatTransport>,
    pub pending: Arc<PendingReplies>,
    pub metrics: PrometheusRecorder,
}

impl AppState {
    pub fn new(
        config: config::Config,
        translator: Arc<dyn Translator>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            config,
            translator,
            transport,
            pending: Arc::new(PendingReplies::new()),
            metrics: PrometheusRecorder::new(),
        }
    }
}
