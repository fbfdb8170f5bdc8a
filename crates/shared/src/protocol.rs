//! Push event names and the socket.io v4 text frame codec.
//!
//! Only the subset the client needs is understood: engine.io open, close,
//! ping and pong, plus socket.io connect, disconnect and event packets on the
//! default or a named namespace. Binary attachments are not supported.

use serde_json::Value;

/// Query string the socket.io server expects on the websocket upgrade.
pub const SOCKET_IO_PATH: &str = "/socket.io/";
pub const SOCKET_IO_QUERY: &str = "EIO=4&transport=websocket";

/// engine.io pong, sent in reply to every ping.
pub const PONG_FRAME: &str = "3";
/// socket.io connect to the default namespace.
pub const CONNECT_FRAME: &str = "40";

/// Events the server pushes to every connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushEvent {
    NewMessage,
    NewChannel,
    RenameChannel,
    RemoveChannel,
}

impl PushEvent {
    pub const ALL: [PushEvent; 4] = [
        PushEvent::NewMessage,
        PushEvent::NewChannel,
        PushEvent::RenameChannel,
        PushEvent::RemoveChannel,
    ];

    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            PushEvent::NewMessage => "newMessage",
            PushEvent::NewChannel => "newChannel",
            PushEvent::RenameChannel => "renameChannel",
            PushEvent::RemoveChannel => "removeChannel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl std::fmt::Display for PushEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// engine.io handshake carrying `sid`, `pingInterval`, ...
    Open(Value),
    Close,
    Ping,
    Pong,
    Noop,
    Connect,
    Disconnect,
    ConnectError(Value),
    Event { name: String, payload: Value },
    /// Anything else the client does not act on (acks, upgrades).
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownType(char),
    #[error("malformed event packet: {0}")]
    MalformedEvent(String),
}

/// Decode one engine.io text frame.
pub fn decode_frame(text: &str) -> Result<Frame, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => Ok(Frame::Open(serde_json::from_str(rest).unwrap_or(Value::Null))),
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_socket_packet(rest),
        '5' => Ok(Frame::Ignored),
        '6' => Ok(Frame::Noop),
        other => Err(FrameError::UnknownType(other)),
    }
}

fn decode_socket_packet(text: &str) -> Result<Frame, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let body = strip_namespace(chars.as_str());

    match kind {
        '0' => Ok(Frame::Connect),
        '1' => Ok(Frame::Disconnect),
        '2' => decode_event(body),
        '3' => Ok(Frame::Ignored),
        '4' => Ok(Frame::ConnectError(
            serde_json::from_str(body).unwrap_or(Value::Null),
        )),
        other => Err(FrameError::UnknownType(other)),
    }
}

/// Skip an optional `/namespace,` prefix.
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn decode_event(body: &str) -> Result<Frame, FrameError> {
    // An ack id may precede the argument array.
    let json = body.trim_start_matches(|c: char| c.is_ascii_digit());

    let args: Vec<Value> = serde_json::from_str(json)
        .map_err(|e| FrameError::MalformedEvent(e.to_string()))?;
    let mut args = args.into_iter();

    let name = match args.next() {
        Some(Value::String(name)) => name,
        _ => return Err(FrameError::MalformedEvent("missing event name".into())),
    };
    let payload = args.next().unwrap_or(Value::Null);

    Ok(Frame::Event { name, payload })
}

/// Encode an event on the default namespace.
pub fn encode_event(name: &str, payload: &Value) -> String {
    format!("42{}", Value::Array(vec![Value::String(name.to_string()), payload.clone()]))
}
