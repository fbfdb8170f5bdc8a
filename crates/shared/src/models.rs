//! Canonical data models for the chat client and the REST request bodies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Username used whenever a payload carries no recognizable author.
pub const DEFAULT_USERNAME: &str = "anonymous";

// --- Channels ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub removable: bool,
}

impl Channel {
    pub fn new(id: i64, name: impl Into<String>, removable: bool) -> Self {
        Self {
            id,
            name: name.into(),
            removable,
        }
    }
}

/// The built-in channels every client starts with.
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::new(1, "general", false),
        Channel::new(2, "random", false),
    ]
}

// --- Messages ---

/// Identity of a message.
///
/// Server ids are numeric. Optimistic messages get a local `temp-<uuid>` id
/// that never leaves the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum MessageId {
    Server(i64),
    Temporary(String),
}

impl MessageId {
    pub fn temporary() -> Self {
        MessageId::Temporary(format!("temp-{}", Uuid::new_v4()))
    }

    pub fn as_server(&self) -> Option<i64> {
        match self {
            MessageId::Server(id) => Some(*id),
            MessageId::Temporary(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub body: String,
    pub channel_id: i64,
    pub username: String,
    /// Set on locally issued placeholders until the server confirms them.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_optimistic: bool,
}

impl Message {
    /// Build a placeholder for a message that has been sent but not yet confirmed.
    pub fn optimistic(body: impl Into<String>, channel_id: i64, username: impl Into<String>) -> Self {
        Self {
            id: Some(MessageId::temporary()),
            body: body.into(),
            channel_id,
            username: username.into(),
            is_optimistic: true,
        }
    }
}

// --- Request status ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Loading => "loading",
            RequestStatus::Succeeded => "succeeded",
            RequestStatus::Failed => "failed",
        }
    }
}

// --- Request bodies ---

/// `{ "data": { "attributes": ... } }` envelope used by the create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceDocument<T> {
    pub data: ResourceBody<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceBody<T> {
    pub attributes: T,
}

impl<T> ResourceDocument<T> {
    pub fn new(attributes: T) -> Self {
        Self {
            data: ResourceBody { attributes },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageAttributes {
    pub body: String,
    pub channel_id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewChannelAttributes {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameChannelRequest {
    pub name: String,
}

/// Body of both `/login` and `/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}
