use crate::correlation::ReplyOutcome;
use crate::telegram::InboundMessage;
use crate::AppState;

pub const ACCEPTED_REPLY: &str = "Thank you! Release notes accepted.";
pub const USE_REPLY_HINT: &str = "Please use the 'Reply' function on the bot's message.";
pub const NO_PENDING_REPLY: &str = "No active translation request. Try again later.";

/// Match one inbound chat message against the pending reply table and answer
/// the sender. Never fails: delivery problems are logged and swallowed.
#[tracing::instrument(skip(state, message), fields(chat_id = message.chat_id, message_id = message.message_id))]
pub async fn handle_message(state: &AppState, message: InboundMessage) -> ReplyOutcome {
    let outcome = match_reply(state, &message);

    let answer = match outcome {
        ReplyOutcome::Accepted => ACCEPTED_REPLY,
        ReplyOutcome::WrongMessage => USE_REPLY_HINT,
        ReplyOutcome::NoPending => NO_PENDING_REPLY,
    };

    tracing::debug!(outcome = outcome.as_str(), "inbound message handled");
    state.metrics.record_inbound(outcome.as_str());
    state.metrics.set_pending(state.pending.len());

    if let Err(e) = state
        .transport
        .reply(message.chat_id, message.message_id, answer)
        .await
    {
        tracing::warn!(error = %e, "failed to acknowledge inbound message");
    }

    outcome
}

fn match_reply(state: &AppState, message: &InboundMessage) -> ReplyOutcome {
    let Some(expected) = state.pending.outbound_message_id(message.chat_id) else {
        return ReplyOutcome::NoPending;
    };

    match (message.reply_to_message_id, message.text.as_ref()) {
        (Some(replied_to), Some(text)) if replied_to == expected => {
            state
                .pending
                .resolve_reply(message.chat_id, replied_to, text.clone())
        }
        // Not a reply, a reply to another message, or a reply without text.
        _ => ReplyOutcome::WrongMessage,
    }
}
