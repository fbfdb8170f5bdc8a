//! Real-time push channel.
//!
//! The server pushes `newMessage`, `newChannel`, `renameChannel` and
//! `removeChannel` events over socket.io. Anything implementing
//! [`PushSource`] can feed them to a [`RealtimeListener`], which turns each
//! event into a store action:
//!
//! ```text
//!   SocketIoConnection ──┐
//!                        ├─ PushSource ─▶ RealtimeListener ─▶ ChatStore
//!   EventHandlers ───────┘
//! ```
//!
//! The socket transport is native only. Other hosts can drive an
//! [`EventHandlers`] table from their own socket.

mod connection;
mod handlers;
mod listener;

pub use connection::{socket_io_url, ConnectionState, ReconnectConfig};
#[cfg(not(target_arch = "wasm32"))]
pub use connection::SocketIoConnection;
pub use handlers::{EventHandlers, Handler, PushSource};
pub use listener::RealtimeListener;
