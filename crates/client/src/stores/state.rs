//! Chat state and its selectors.

use hexchat_shared::{default_channels, Channel, Message, RequestFailure, RequestStatus};
use serde::{Deserialize, Serialize};

/// Everything the chat view renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    /// Channels in arrival order; ids are unique.
    pub channels: Vec<Channel>,
    /// Messages in insertion order.
    pub messages: Vec<Message>,
    /// Always the id of an entry in `channels` when set.
    pub current_channel_id: Option<i64>,
    /// Status of the initial fetch.
    pub status: RequestStatus,
    /// Status of the latest message send.
    pub sending: RequestStatus,
    /// Most recent request failure.
    pub error: Option<RequestFailure>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            messages: Vec::new(),
            current_channel_id: None,
            status: RequestStatus::Idle,
            sending: RequestStatus::Idle,
            error: None,
        }
    }
}

impl ChatState {
    pub fn channel(&self, id: i64) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn has_channel(&self, id: i64) -> bool {
        self.channel(id).is_some()
    }

    pub fn current_channel(&self) -> Option<&Channel> {
        self.current_channel_id.and_then(|id| self.channel(id))
    }

    pub fn first_channel_id(&self) -> Option<i64> {
        self.channels.first().map(|c| c.id)
    }

    pub fn messages_in(&self, channel_id: i64) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.channel_id == channel_id)
    }

    /// Messages of the selected channel.
    pub fn current_messages(&self) -> Vec<&Message> {
        match self.current_channel_id {
            Some(id) => self.messages_in(id).collect(),
            None => Vec::new(),
        }
    }

    pub fn optimistic_count(&self, channel_id: i64) -> usize {
        self.messages_in(channel_id).filter(|m| m.is_optimistic).count()
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// Remove a channel together with its messages, moving the selection
    /// to the first remaining channel when it pointed at the removed one.
    pub(crate) fn remove_channel_cascade(&mut self, id: i64) {
        self.channels.retain(|c| c.id != id);
        self.messages.retain(|m| m.channel_id != id);

        if self.current_channel_id == Some(id) {
            self.current_channel_id = self.first_channel_id();
        }
    }
}
