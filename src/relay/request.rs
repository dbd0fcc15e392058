use std::time::Instant;

use bytes::Bytes;

use crate::correlation::PendingReplies;
use crate::errors::AppError;
use crate::models::release_notes::ReleaseNotesRequest;
use crate::telegram::{ChatTransport, TelegramError};
use crate::AppState;

pub const REVIEW_FILE_NAME: &str = "release_notes.txt";
pub const REVIEW_FILE_CAPTION: &str = "Release notes for translation";

const REVIEW_INSTRUCTIONS: &str =
    "Please send the edited version using the 'Reply' function on this message.";

/// Translate the notes, hand them to the reviewer and wait for the edited version.
///
/// Resolves with the reviewer's reply text. Fails with [`AppError::ReplyTimeout`]
/// once the configured reply window elapses; the pending entry is gone by then.
#[tracing::instrument(
    skip(state, request),
    fields(chat_id = tracing::field::Empty, target_language = %request.target_language)
)]
pub async fn relay_release_notes(
    state: &AppState,
    request: ReleaseNotesRequest,
) -> Result<String, AppError> {
    let start = Instant::now();
    let result = relay(state, request).await;

    let outcome = match &result {
        Ok(_) => "fulfilled",
        Err(e) => e.kind(),
    };
    tracing::info!(outcome, elapsed_ms = start.elapsed().as_millis() as u64, "release notes request finished");
    state.metrics.record_request(outcome, start.elapsed());
    state.metrics.set_pending(state.pending.len());

    result
}

async fn relay(state: &AppState, request: ReleaseNotesRequest) -> Result<String, AppError> {
    // -- 1. Translate --
    let translated = state
        .translator
        .translate(&request.notes, &request.target_language)
        .await?;

    // -- 2. Send for review --
    let chat_id = request.chat_id.unwrap_or(state.config.default_chat_id);
    tracing::Span::current().record("chat_id", chat_id);

    let message_id =
        deliver_for_review(state.transport.as_ref(), chat_id, &request.notes, &translated)
            .await?;

    // -- 3. Register --
    let handle = state.pending.register(chat_id, message_id);
    let _guard = PendingGuard {
        pending: &state.pending,
        chat_id,
        message_id,
    };
    state.metrics.set_pending(state.pending.len());
    tracing::info!(chat_id, message_id, "waiting for reviewer reply");

    // -- 4. Await reply --
    match tokio::time::timeout(state.config.reply_timeout, handle).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(_)) => Err(AppError::ReplySuperseded),
        Err(_) => {
            state.pending.cancel_message(chat_id, message_id);
            tracing::warn!(
                chat_id,
                message_id,
                timeout_secs = state.config.reply_timeout.as_secs(),
                "reviewer did not reply in time"
            );
            Err(AppError::ReplyTimeout)
        }
    }
}

/// Removes this request's entry if the request future is dropped mid-wait
/// (client disconnect). A newer entry for the same chat is left alone.
struct PendingGuard<'a> {
    pending: &'a PendingReplies,
    chat_id: i64,
    message_id: i64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.cancel_message(self.chat_id, self.message_id);
    }
}

/// Send the review message, falling back to a text file when Telegram rejects
/// the inline message as too long. Returns the id the reviewer must reply to.
pub async fn deliver_for_review(
    transport: &dyn ChatTransport,
    chat_id: i64,
    notes: &str,
    translated: &str,
) -> Result<i64, TelegramError> {
    match transport
        .send_html(chat_id, &review_message_html(notes, translated))
        .await
    {
        Ok(id) => Ok(id),
        Err(TelegramError::MessageTooLong) => {
            tracing::info!(chat_id, "review message too long, sending as document");
            transport
                .send_document(
                    chat_id,
                    REVIEW_FILE_NAME,
                    Bytes::from(review_document_text(notes, translated)),
                    REVIEW_FILE_CAPTION,
                )
                .await
        }
        Err(e) => Err(e),
    }
}

pub fn review_message_html(notes: &str, translated: &str) -> String {
    format!(
        "New release notes for translation:\n\n<pre>{}</pre>\n\n\
         Translated release notes:\n\n<pre>{}</pre>\n\n{}",
        escape_html(notes),
        escape_html(translated),
        REVIEW_INSTRUCTIONS,
    )
}

pub fn review_document_text(notes: &str, translated: &str) -> String {
    format!(
        "New release notes for translation:\n\n{}\n\n\
         Translated release notes:\n\n{}\n\n{}",
        notes, translated, REVIEW_INSTRUCTIONS,
    )
}

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
