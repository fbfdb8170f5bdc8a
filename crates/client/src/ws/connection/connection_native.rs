//! Native socket.io client using tokio-tungstenite.

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::{SinkExt, StreamExt};
use hexchat_shared::{decode_frame, encode_event, Frame, CONNECT_FRAME, PONG_FRAME};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{ConnectionState, ReconnectConfig};
use crate::ws::handlers::{EventHandlers, Handler, PushSource};

/// A managed socket.io connection (native implementation).
///
/// Incoming events fan out through an [`EventHandlers`] table, so handlers can
/// be registered before, during or after connecting. Dropping the connection
/// stops its background task.
pub struct SocketIoConnection {
    url: String,
    state: watch::Receiver<ConnectionState>,
    handlers: EventHandlers,
    sender: UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl SocketIoConnection {
    /// Connect to `url` (see [`super::socket_io_url`]) and keep reconnecting
    /// according to `reconnect_config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(url: impl Into<String>, reconnect_config: ReconnectConfig) -> Self {
        let url = url.into();
        let (sender, receiver) = unbounded();
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let handlers = EventHandlers::new();

        let task = tokio::spawn(connection_loop(
            url.clone(),
            state_tx,
            receiver,
            handlers.clone(),
            reconnect_config,
        ));

        Self {
            url,
            state,
            handlers,
            sender,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Watch connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    /// Emit an event to the server. Queued until the socket is open.
    pub fn emit(&self, event: &str, payload: &Value) -> Result<(), String> {
        self.sender
            .unbounded_send(encode_event(event, payload))
            .map_err(|e| format!("Failed to send: {}", e))
    }

    pub fn close(&self) {
        self.task.abort();
    }
}

impl PushSource for SocketIoConnection {
    fn on(&self, event: &str, handler: Handler) {
        self.handlers.on(event, handler);
    }

    fn off(&self, event: &str) {
        self.handlers.off(event);
    }
}

impl Drop for SocketIoConnection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

enum SessionEnd {
    /// Socket dropped; reconnect. `joined` tells whether the namespace ack
    /// arrived first.
    Lost { joined: bool },
    /// Every sender is gone; stop for good.
    Shutdown,
}

async fn connection_loop(
    url: String,
    state: watch::Sender<ConnectionState>,
    mut outbound: UnboundedReceiver<String>,
    handlers: EventHandlers,
    reconnect_config: ReconnectConfig,
) {
    let mut attempt = 0u32;

    loop {
        state.send_replace(ConnectionState::Connecting { attempt });

        match connect_async(url.as_str()).await {
            Ok((ws_stream, _response)) => {
                crate::log_info!("socket opened to {}", url);
                state.send_replace(ConnectionState::Handshaking);

                let end = run_session(ws_stream, &state, &mut outbound, &handlers).await;
                state.send_replace(ConnectionState::Disconnected);
                match end {
                    SessionEnd::Shutdown => {
                        crate::log_info!("socket to {} shut down", url);
                        return;
                    }
                    SessionEnd::Lost { joined } => {
                        crate::log_info!("socket to {} closed", url);
                        if joined {
                            attempt = 0;
                        }
                    }
                }
            }
            Err(e) => {
                crate::log_error!("socket error for {}: {}", url, e);
            }
        }

        attempt += 1;
        if reconnect_config.exhausted(attempt) {
            crate::log_error!("giving up on {} after {} retries", url, attempt - 1);
            state.send_replace(ConnectionState::Failed {
                reason: format!("no connection after {} retries", attempt - 1),
            });
            return;
        }

        let delay = reconnect_config.delay(attempt);
        crate::log_info!("reconnecting to {} in {:?} (attempt {})", url, delay, attempt);
        tokio::time::sleep(delay).await;
    }
}

async fn run_session<S>(
    ws_stream: S,
    state: &watch::Sender<ConnectionState>,
    outbound: &mut UnboundedReceiver<String>,
    handlers: &EventHandlers,
) -> SessionEnd
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut write, mut read) = ws_stream.split();
    let mut joined = false;

    loop {
        tokio::select! {
            incoming = read.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Lost { joined },
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        crate::log_error!("socket read error: {}", e);
                        return SessionEnd::Lost { joined };
                    }
                };

                let reply = match decode_frame(&text) {
                    Ok(Frame::Open(_)) => Some(CONNECT_FRAME),
                    Ok(Frame::Ping) => Some(PONG_FRAME),
                    Ok(Frame::Connect) => {
                        joined = true;
                        state.send_replace(ConnectionState::Connected);
                        None
                    }
                    Ok(Frame::Event { name, payload }) => {
                        crate::log_debug!("push event {}", name);
                        if handlers.emit(&name, payload) == 0 {
                            crate::log_debug!("no handler for {}", name);
                        }
                        None
                    }
                    Ok(Frame::ConnectError(reason)) => {
                        crate::log_error!("socket.io connect refused: {}", reason);
                        return SessionEnd::Lost { joined };
                    }
                    Ok(Frame::Close) | Ok(Frame::Disconnect) => return SessionEnd::Lost { joined },
                    Ok(Frame::Pong) | Ok(Frame::Noop) | Ok(Frame::Ignored) => None,
                    Err(e) => {
                        crate::log_debug!("skipping frame {:?}: {}", text.as_str(), e);
                        None
                    }
                };

                if let Some(frame) = reply {
                    if let Err(e) = write.send(Message::text(frame)).await {
                        crate::log_error!("socket write error: {}", e);
                        return SessionEnd::Lost { joined };
                    }
                }
            }
            queued = outbound.next() => {
                let Some(frame) = queued else {
                    return SessionEnd::Shutdown;
                };
                if let Err(e) = write.send(Message::text(frame)).await {
                    crate::log_error!("socket write error: {}", e);
                    return SessionEnd::Lost { joined };
                }
            }
        }
    }
}
