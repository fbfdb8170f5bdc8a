//! Bridges push events into the chat store.

use std::sync::Arc;

use hexchat_shared::PushEvent;
use serde_json::Value;

use super::handlers::PushSource;
use crate::stores::{ChatAction, ChatStore};

pub struct RealtimeListener;

impl RealtimeListener {
    /// Route every push event on `source` into `store`.
    ///
    /// Existing handlers for these events are removed first, so attaching
    /// again (after a reconnect or a remount) never dispatches twice.
    pub fn attach(source: &dyn PushSource, store: &ChatStore) {
        for event in PushEvent::ALL {
            source.off(event.as_str());
            let store = store.clone();
            source.on(
                event.as_str(),
                Arc::new(move |payload: Value| store.dispatch(action_for(event, payload))),
            );
        }
        crate::log_debug!("realtime listener attached");
    }

    pub fn detach(source: &dyn PushSource) {
        for event in PushEvent::ALL {
            source.off(event.as_str());
        }
    }
}

fn action_for(event: PushEvent, payload: Value) -> ChatAction {
    match event {
        PushEvent::NewMessage => ChatAction::MessageReceived(payload),
        PushEvent::NewChannel => ChatAction::ChannelReceived(payload),
        PushEvent::RenameChannel => ChatAction::ChannelRenamed(payload),
        PushEvent::RemoveChannel => ChatAction::ChannelRemoved(payload),
    }
}
