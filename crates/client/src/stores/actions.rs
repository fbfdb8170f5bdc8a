//! Serializable store actions.
//!
//! Plain actions carry raw push payloads; the reducer normalizes them. Each
//! remote operation is one action per phase: `Pending` before the request,
//! then `Fulfilled` or `Rejected` once it resolves.

use hexchat_shared::RequestFailure;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "payload", rename_all = "camelCase")]
pub enum AsyncPhase<T> {
    Pending,
    Fulfilled(T),
    Rejected(RequestFailure),
}

impl<T> AsyncPhase<T> {
    pub fn name(&self) -> &'static str {
        match self {
            AsyncPhase::Pending => "pending",
            AsyncPhase::Fulfilled(_) => "fulfilled",
            AsyncPhase::Rejected(_) => "rejected",
        }
    }
}

/// Result of the combined channel + message fetch, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedChatData {
    pub channels: Vec<Value>,
    pub messages: Vec<Value>,
    pub current_channel_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageArg {
    pub body: String,
    pub channel_id: i64,
    /// Author shown on the optimistic placeholder.
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChannelArg {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameChannelArg {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveChannelArg {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ChatAction {
    MessageReceived(Value),
    SetCurrentChannelId(i64),
    ChannelReceived(Value),
    ChannelRenamed(Value),
    ChannelRemoved(Value),
    FetchChatData(AsyncPhase<FetchedChatData>),
    SendMessage {
        arg: SendMessageArg,
        phase: AsyncPhase<Value>,
    },
    CreateChannel {
        arg: CreateChannelArg,
        phase: AsyncPhase<Value>,
    },
    RenameChannel {
        arg: RenameChannelArg,
        phase: AsyncPhase<Value>,
    },
    RemoveChannel {
        arg: RemoveChannelArg,
        phase: AsyncPhase<Value>,
    },
}

impl ChatAction {
    /// Redux-style action type, e.g. `chat/sendMessage/pending`.
    pub fn type_name(&self) -> String {
        match self {
            ChatAction::MessageReceived(_) => "chat/messageReceived".into(),
            ChatAction::SetCurrentChannelId(_) => "chat/setCurrentChannelId".into(),
            ChatAction::ChannelReceived(_) => "chat/channelReceived".into(),
            ChatAction::ChannelRenamed(_) => "chat/channelRenamed".into(),
            ChatAction::ChannelRemoved(_) => "chat/channelRemoved".into(),
            ChatAction::FetchChatData(phase) => format!("chat/fetchChatData/{}", phase.name()),
            ChatAction::SendMessage { phase, .. } => format!("chat/sendMessage/{}", phase.name()),
            ChatAction::CreateChannel { phase, .. } => {
                format!("chat/createChannel/{}", phase.name())
            }
            ChatAction::RenameChannel { phase, .. } => {
                format!("chat/renameChannel/{}", phase.name())
            }
            ChatAction::RemoveChannel { phase, .. } => {
                format!("chat/removeChannel/{}", phase.name())
            }
        }
    }
}
