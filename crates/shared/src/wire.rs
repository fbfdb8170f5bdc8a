//! Accepted server payload shapes and their normalization.
//!
//! The backend and the socket both send channels and messages either flat
//! (`{ id, body, channelId, ... }`) or wrapped as a resource document
//! (`{ data: { id, attributes: { ... } } }`). Each shape is an explicit
//! variant here and everything funnels into the canonical [`Channel`] and
//! [`Message`] records. Fields of the wrong JSON type are treated as absent
//! instead of failing the whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{Channel, Message, MessageId, DEFAULT_USERNAME};

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A numeric field that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl LooseNumber {
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(n) => Some(*n),
            LooseNumber::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) => s.trim().parse().ok(),
            LooseNumber::Other(_) => None,
        }
    }

    /// Like [`to_i64`](Self::to_i64) but treats zero as absent.
    pub fn to_nonzero(&self) -> Option<i64> {
        self.to_i64().filter(|n| *n != 0)
    }
}

// =========================================
// Messages
// =========================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonRef {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Message fields as they appear either at top level or under `attributes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFields {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub channel_id: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<PersonRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<PersonRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<PersonRef>,
}

impl MessageFields {
    /// First non-empty author field, or [`DEFAULT_USERNAME`].
    pub fn username(&self) -> String {
        let user = self.user.as_ref();

        [
            self.username.clone(),
            self.nickname.clone(),
            self.name.clone(),
            user.and_then(|p| p.username.clone()),
            user.and_then(|p| p.name.clone()),
            self.author.as_ref().and_then(|p| p.username.clone()),
            self.sender.as_ref().and_then(|p| p.username.clone()),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResource {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<LooseNumber>,
    pub attributes: MessageFields,
}

/// Every accepted message payload shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageWire {
    Document { data: MessageResource },
    Flat(MessageFields),
}

impl MessageWire {
    /// Canonical message, or `None` when the payload names no channel.
    pub fn into_message(self) -> Option<Message> {
        let (id, fields) = match self {
            MessageWire::Document { data } => {
                let id = data
                    .id
                    .as_ref()
                    .and_then(LooseNumber::to_i64)
                    .or_else(|| data.attributes.id.as_ref().and_then(LooseNumber::to_i64));
                (id, data.attributes)
            }
            MessageWire::Flat(fields) => {
                let id = fields.id.as_ref().and_then(LooseNumber::to_i64);
                (id, fields)
            }
        };

        let channel_id = fields.channel_id.as_ref().and_then(LooseNumber::to_nonzero)?;

        Some(Message {
            id: id.map(MessageId::Server),
            username: fields.username(),
            body: fields.body.unwrap_or_default(),
            channel_id,
            is_optimistic: false,
        })
    }
}

/// Normalize any accepted message payload.
pub fn normalize_message(payload: &Value) -> Option<Message> {
    MessageWire::deserialize(payload).ok()?.into_message()
}

// =========================================
// Channels
// =========================================

/// Channel payload with its optional `data` and `attributes` layers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelWire {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub removable: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<Box<ChannelWire>>,
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Option<Box<ChannelWire>>,
}

impl ChannelWire {
    /// Canonical channel, or `None` without a usable id and name.
    ///
    /// `id` and `name` are looked up top-level, then `data`, then
    /// `attributes`; `removable` top-level, then `attributes`, then `data`.
    pub fn into_channel(self) -> Option<Channel> {
        let id = self.channel_id()?;
        let data = self.data.as_deref().unwrap_or(&self);
        let attributes = data
            .attributes
            .as_deref()
            .or(self.attributes.as_deref());

        let layers = [Some(&self), Some(data), attributes];

        let name = layers
            .iter()
            .flatten()
            .find_map(|layer| layer.name.clone().filter(|n| !n.is_empty()))?;
        let removable = self
            .removable
            .or_else(|| attributes.and_then(|a| a.removable))
            .or(data.removable)
            .unwrap_or(true);

        Some(Channel { id, name, removable })
    }

    /// The channel id alone, resolved through the same layers.
    pub fn channel_id(&self) -> Option<i64> {
        let data = self.data.as_deref().unwrap_or(self);
        let attributes = data
            .attributes
            .as_deref()
            .or(self.attributes.as_deref());

        [Some(self), Some(data), attributes]
            .into_iter()
            .flatten()
            .find_map(|layer| layer.id.as_ref().and_then(LooseNumber::to_nonzero))
    }
}

/// Normalize any accepted channel payload.
pub fn normalize_channel(payload: &Value) -> Option<Channel> {
    ChannelWire::deserialize(payload).ok()?.into_channel()
}

/// Channel id of a payload that may lack a usable name.
pub fn channel_id_of(payload: &Value) -> Option<i64> {
    ChannelWire::deserialize(payload).ok()?.channel_id()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdOnly {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<LooseNumber>,
}

/// Payload of a channel removal: `{ id }`, `{ data: { id } }` or a bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemovedChannelWire {
    Object {
        #[serde(default, deserialize_with = "lenient")]
        id: Option<LooseNumber>,
        #[serde(default, deserialize_with = "lenient")]
        data: Option<IdOnly>,
    },
    Bare(LooseNumber),
}

impl RemovedChannelWire {
    pub fn channel_id(&self) -> Option<i64> {
        match self {
            RemovedChannelWire::Object { id, data } => id
                .as_ref()
                .or_else(|| data.as_ref().and_then(|d| d.id.as_ref()))
                .and_then(LooseNumber::to_nonzero),
            RemovedChannelWire::Bare(id) => id.to_nonzero(),
        }
    }
}

/// Id of the channel a removal payload refers to.
pub fn removed_channel_id(payload: &Value) -> Option<i64> {
    RemovedChannelWire::deserialize(payload).ok()?.channel_id()
}

// =========================================
// Collections
// =========================================

fn truthy(value: &&Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Items of a list response.
///
/// Accepts `{ <key>: [...] }`, `{ data: { <key>: [...] } }`, a bare array, or
/// an object map whose values are the items.
pub fn extract_collection(body: &Value, key: &str) -> Vec<Value> {
    let picked = body
        .get(key)
        .filter(truthy)
        .or_else(|| body.get("data").and_then(|d| d.get(key)).filter(truthy))
        .unwrap_or(body);

    match picked {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        _ => Vec::new(),
    }
}

/// `currentChannelId` advertised by a channel list response, if any.
pub fn extract_current_channel_id(body: &Value) -> Option<i64> {
    [
        body.get("currentChannelId"),
        body.get("data").and_then(|d| d.get("currentChannelId")),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| LooseNumber::deserialize(v).ok()?.to_nonzero())
}
