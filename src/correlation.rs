//! Pending reply table: matches reviewer replies to waiting HTTP requests.
//!
//! One entry per chat. An entry pairs the id of the bot message the reviewer
//! must reply to with the sending half of a oneshot channel; the request that
//! registered it holds the receiving half. Every operation is a single map
//! operation, so an entry is removed and completed as one step.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::oneshot;

/// Receiving half handed to the request that is waiting for a reply.
pub type PendingHandle = oneshot::Receiver<String>;

struct PendingReply {
    outbound_message_id: i64,
    reply_tx: oneshot::Sender<String>,
    created_at: DateTime<Utc>,
}

/// Result of offering an inbound reply to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The pending request for the chat was completed with the reply text.
    Accepted,
    /// Nothing is waiting in this chat.
    NoPending,
    /// Something is waiting, but the message does not answer the bot's message.
    WrongMessage,
}

impl ReplyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyOutcome::Accepted => "accepted",
            ReplyOutcome::NoPending => "no_pending",
            ReplyOutcome::WrongMessage => "wrong_message",
        }
    }
}

#[derive(Default)]
pub struct PendingReplies {
    entries: DashMap<i64, PendingReply>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting for a reply to `outbound_message_id` in `chat_id`.
    ///
    /// Replaces any entry already registered for the chat. The replaced
    /// request's handle resolves with a `RecvError` as its sender is dropped.
    pub fn register(&self, chat_id: i64, outbound_message_id: i64) -> PendingHandle {
        let (reply_tx, reply_rx) = oneshot::channel();
        let previous = self.entries.insert(
            chat_id,
            PendingReply {
                outbound_message_id,
                reply_tx,
                created_at: Utc::now(),
            },
        );

        if let Some(prev) = previous {
            tracing::warn!(
                chat_id,
                replaced_message_id = prev.outbound_message_id,
                outbound_message_id,
                "pending reply replaced by a newer request for the same chat"
            );
        }

        reply_rx
    }

    /// Complete the pending request for `chat_id` with `text`.
    ///
    /// Returns `false` when nothing is pending; resolving twice is a no-op.
    pub fn resolve(&self, chat_id: i64, text: String) -> bool {
        match self.entries.remove(&chat_id) {
            Some((_, entry)) => complete(chat_id, entry, text),
            None => false,
        }
    }

    /// Complete the pending request only if `replied_to` is the message it waits on.
    pub fn resolve_reply(&self, chat_id: i64, replied_to: i64, text: String) -> ReplyOutcome {
        let removed = self
            .entries
            .remove_if(&chat_id, |_, entry| entry.outbound_message_id == replied_to);

        match removed {
            Some((_, entry)) => {
                if complete(chat_id, entry, text) {
                    ReplyOutcome::Accepted
                } else {
                    ReplyOutcome::NoPending
                }
            }
            None if self.entries.contains_key(&chat_id) => ReplyOutcome::WrongMessage,
            None => ReplyOutcome::NoPending,
        }
    }

    /// Drop the entry for `chat_id` without completing it.
    pub fn cancel(&self, chat_id: i64) -> bool {
        self.entries.remove(&chat_id).is_some()
    }

    /// Drop the entry for `chat_id` only if it still waits on `outbound_message_id`.
    pub fn cancel_message(&self, chat_id: i64, outbound_message_id: i64) -> bool {
        self.entries
            .remove_if(&chat_id, |_, entry| {
                entry.outbound_message_id == outbound_message_id
            })
            .is_some()
    }

    pub fn contains(&self, chat_id: i64) -> bool {
        self.entries.contains_key(&chat_id)
    }

    /// Id of the bot message the reviewer in `chat_id` must reply to.
    pub fn outbound_message_id(&self, chat_id: i64) -> Option<i64> {
        self.entries.get(&chat_id).map(|e| e.outbound_message_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn complete(chat_id: i64, entry: PendingReply, text: String) -> bool {
    let waited_secs = (Utc::now() - entry.created_at).num_seconds();
    match entry.reply_tx.send(text) {
        Ok(()) => {
            tracing::info!(
                chat_id,
                outbound_message_id = entry.outbound_message_id,
                waited_secs,
                "reviewer reply delivered"
            );
            true
        }
        Err(_) => {
            // Receiver gone: the HTTP caller disconnected before the reply arrived.
            tracing::debug!(chat_id, "reviewer reply arrived after the request was dropped");
            false
        }
    }
}
