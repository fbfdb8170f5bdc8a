//! Snapshot persistence for the chat lists.

use std::sync::Arc;

use hexchat_shared::{default_channels, Channel, Message};

use super::reducer::Persist;
use super::state::ChatState;
use crate::storage::{self, keys, Storage};

/// Mirrors the channel and message lists into storage after reductions.
///
/// Writes are best-effort. A failed write is logged and never reaches the
/// caller.
#[derive(Clone)]
pub struct SnapshotWriter {
    storage: Arc<dyn Storage>,
}

impl SnapshotWriter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn write(&self, state: &ChatState, persist: Persist) {
        if persist.channels && !storage::save(self.storage.as_ref(), keys::CHAT_CHANNELS, &state.channels) {
            crate::log_debug!("failed to persist {} channels", state.channels.len());
        }
        if persist.messages && !storage::save(self.storage.as_ref(), keys::CHAT_MESSAGES, &state.messages) {
            crate::log_debug!("failed to persist {} messages", state.messages.len());
        }
    }
}

/// Build the initial state from the last snapshot.
///
/// Unreadable or empty channel lists fall back to the defaults; unreadable
/// messages start empty.
pub fn load_snapshot(storage: &dyn Storage) -> ChatState {
    let channels = storage::load::<Vec<Channel>>(storage, keys::CHAT_CHANNELS)
        .filter(|channels| !channels.is_empty())
        .unwrap_or_else(default_channels);
    let messages = storage::load::<Vec<Message>>(storage, keys::CHAT_MESSAGES).unwrap_or_default();

    ChatState {
        channels,
        messages,
        ..ChatState::default()
    }
}
