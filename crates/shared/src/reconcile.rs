//! Deduplication and optimistic-message reconciliation.
//!
//! Optimistic placeholders are matched to their confirmation by content:
//! the `(channel_id, body, username)` triple. Two identical sends from the
//! same user into the same channel are indistinguishable under this rule.

use std::collections::HashSet;

use crate::models::Message;

/// True if `message` has an id and some entry in `messages` shares it.
/// Messages without an id are never duplicates.
pub fn is_duplicate_message(messages: &[Message], message: &Message) -> bool {
    match &message.id {
        Some(id) => messages.iter().any(|m| m.id.as_ref() == Some(id)),
        None => false,
    }
}

/// Drop optimistic placeholders whose content triple matches exactly.
pub fn remove_optimistic_messages(
    messages: &mut Vec<Message>,
    channel_id: i64,
    body: &str,
    username: &str,
) {
    messages.retain(|m| {
        !(m.is_optimistic && m.channel_id == channel_id && m.body == body && m.username == username)
    });
}

/// Drop every optimistic placeholder in a channel.
pub fn remove_optimistic_for_channel(messages: &mut Vec<Message>, channel_id: i64) {
    messages.retain(|m| !(m.is_optimistic && m.channel_id == channel_id));
}

/// Keep the first occurrence of each id, in order.
pub fn unique_messages(messages: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|m| match &m.id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}
