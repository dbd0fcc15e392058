//! Inbound message handling against the pending reply table.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeTranslator, FakeTransport};
use notebridge::correlation::ReplyOutcome;
use notebridge::relay::inbound::{self, ACCEPTED_REPLY, NO_PENDING_REPLY, USE_REPLY_HINT};
use notebridge::telegram::InboundMessage;

const CHAT: i64 = 77;

fn setup() -> (Arc<FakeTransport>, Arc<notebridge::AppState>) {
    let transport = Arc::new(FakeTransport::new());
    let state = common::state(
        FakeTranslator::Returns("unused".into()),
        transport.clone(),
        Duration::from_secs(5),
    );
    (transport, state)
}

fn message(reply_to: Option<i64>, text: Option<&str>) -> InboundMessage {
    InboundMessage {
        chat_id: CHAT,
        message_id: 500,
        text: text.map(str::to_string),
        reply_to_message_id: reply_to,
    }
}

#[tokio::test]
async fn test_message_without_pending_request() {
    let (transport, state) = setup();

    let outcome = inbound::handle_message(&state, message(Some(1), Some("hello"))).await;

    assert_eq!(outcome, ReplyOutcome::NoPending);
    assert!(state.pending.is_empty());
    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].chat_id, CHAT);
    assert_eq!(replies[0].reply_to, 500);
    assert_eq!(replies[0].text, NO_PENDING_REPLY);
}

#[tokio::test]
async fn test_pending_request_in_other_chat_is_untouched() {
    let (transport, state) = setup();
    let _handle = state.pending.register(CHAT + 1, 42);

    let outcome = inbound::handle_message(&state, message(Some(42), Some("hello"))).await;

    assert_eq!(outcome, ReplyOutcome::NoPending);
    assert_eq!(state.pending.outbound_message_id(CHAT + 1), Some(42));
    assert_eq!(transport.replies()[0].text, NO_PENDING_REPLY);
}

#[tokio::test]
async fn test_matching_reply_resolves_once() {
    let (transport, state) = setup();
    let handle = state.pending.register(CHAT, 42);

    let first = inbound::handle_message(&state, message(Some(42), Some("edited"))).await;
    let second = inbound::handle_message(&state, message(Some(42), Some("edited again"))).await;

    assert_eq!(first, ReplyOutcome::Accepted);
    assert_eq!(second, ReplyOutcome::NoPending);
    assert_eq!(handle.await.unwrap(), "edited");

    let texts: Vec<String> = transport.replies().into_iter().map(|r| r.text).collect();
    assert_eq!(texts, vec![ACCEPTED_REPLY, NO_PENDING_REPLY]);
}

#[tokio::test]
async fn test_reply_without_text_stays_pending() {
    let (transport, state) = setup();
    let _handle = state.pending.register(CHAT, 42);

    let outcome = inbound::handle_message(&state, message(Some(42), None)).await;

    assert_eq!(outcome, ReplyOutcome::WrongMessage);
    assert!(state.pending.contains(CHAT));
    assert_eq!(transport.replies()[0].text, USE_REPLY_HINT);
}

#[tokio::test]
async fn test_plain_message_gets_reply_hint() {
    let (transport, state) = setup();
    let _handle = state.pending.register(CHAT, 42);

    let outcome = inbound::handle_message(&state, message(None, Some("here you go"))).await;

    assert_eq!(outcome, ReplyOutcome::WrongMessage);
    assert_eq!(state.pending.outbound_message_id(CHAT), Some(42));
    assert_eq!(transport.replies()[0].text, USE_REPLY_HINT);
}
