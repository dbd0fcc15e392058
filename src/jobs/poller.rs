//! Background job: long-poll Telegram for new messages.
//!
//! Every message is handed to [`crate::relay::inbound::handle_message`] on its
//! own task so a slow acknowledgement never stalls the poll loop. Transport
//! errors are logged and polling resumes after a short pause.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::relay::inbound;
use crate::telegram::{InboundMessage, UpdateSource};
use crate::AppState;

/// Seconds Telegram holds a `getUpdates` call open waiting for new updates.
pub const POLL_TIMEOUT_SECS: u64 = 30;

const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Spawn the update poller. It runs until `shutdown` flips or its sender drops.
pub fn spawn(
    source: Arc<dyn UpdateSource>,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(run(source, state, shutdown, POLL_TIMEOUT_SECS))
}

pub async fn run(
    source: Arc<dyn UpdateSource>,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
    poll_timeout_secs: u64,
) {
    let mut offset: Option<i64> = None;
    tracing::info!("telegram update poller started");

    loop {
        let batch = tokio::select! {
            _ = shutdown.changed() => break,
            res = source.get_updates(offset, poll_timeout_secs) => res,
        };

        match batch {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);

                    let Some(message) = update.message else {
                        tracing::debug!(update_id = update.update_id, "skipping non-message update");
                        continue;
                    };

                    let state = state.clone();
                    tokio::spawn(async move {
                        inbound::handle_message(&state, InboundMessage::from(&message)).await;
                    });
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, pausing before next poll");
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(ERROR_PAUSE) => {}
                }
            }
        }
    }

    tracing::info!("telegram update poller stopped");
}
