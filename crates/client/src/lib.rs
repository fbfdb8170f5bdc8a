//! Hexchat Client - headless chat client core
//!
//! Holds the chat store and everything that feeds it: REST sync operations,
//! the socket.io push listener, session handling and local persistence. The
//! same code backs the web build (localStorage) and the native `hexchat`
//! terminal client.

pub mod logging;

pub mod api_client;
pub mod config;
pub mod forms;
pub mod language;
pub mod session;
pub mod storage;
pub mod stores;
pub mod sync;
pub mod ws;

pub use api_client::ApiClient;
pub use config::ClientConfig;
pub use language::Language;
pub use session::{AuthError, Credentials, GuardState, SessionClient, SessionGuard};
pub use storage::{MemoryStorage, Storage};
pub use stores::{ChatAction, ChatState, ChatStore};
pub use sync::ChatSync;
pub use ws::{EventHandlers, PushSource, RealtimeListener};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
