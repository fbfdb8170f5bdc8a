//! Socket connection state and reconnect policy.
//!
//! The shared types live here; the transport itself is native only.

use std::time::Duration;

use hexchat_shared::{SOCKET_IO_PATH, SOCKET_IO_QUERY};

/// Where the push socket is in its connect cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No session. Also reported after a session drops.
    Disconnected,
    /// Dialing the websocket. `attempt` counts failures since the last
    /// joined session; 0 is the first try.
    Connecting { attempt: u32 },
    /// Websocket open, waiting for the namespace `40` ack.
    Handshaking,
    /// Namespace joined; pushes flow.
    Connected,
    /// Retries used up. The connection task has stopped.
    Failed { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting { .. } | ConnectionState::Handshaking
        )
    }
}

/// Exponential backoff between socket retries.
///
/// A retry is any dial, upgrade or handshake that ends before the namespace
/// is joined.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: Some(10),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 1.5,
        }
    }
}

impl ReconnectConfig {
    /// Wait before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(64) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt > max)
    }
}

/// Websocket URL of the socket.io endpoint under `socket_url`.
///
/// The token, when given, rides along as a `token` query parameter.
pub fn socket_io_url(socket_url: &str, token: Option<&str>) -> String {
    let base = socket_url.trim_end_matches('/');
    let mut url = format!("{base}{SOCKET_IO_PATH}?{SOCKET_IO_QUERY}");
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.push_str("&token=");
        url.push_str(&urlencoding::encode(token));
    }
    url
}

#[cfg(not(target_arch = "wasm32"))]
mod connection_native;
#[cfg(not(target_arch = "wasm32"))]
pub use connection_native::SocketIoConnection;
