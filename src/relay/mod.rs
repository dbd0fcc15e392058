//! The relay between release notes requests and the reviewer chat.
//!
//! [`request::relay_release_notes`] drives one HTTP request from translation to
//! the reviewer's reply; [`inbound::handle_message`] feeds reviewer messages
//! back into the pending reply table.

pub mod inbound;
pub mod request;
