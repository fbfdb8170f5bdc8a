//! Chat state store.

pub mod actions;
pub mod chat;
pub mod persist;
pub mod reducer;
pub mod state;

pub use actions::{
    AsyncPhase, ChatAction, CreateChannelArg, FetchedChatData, RemoveChannelArg,
    RenameChannelArg, SendMessageArg,
};
pub use chat::ChatStore;
pub use persist::{load_snapshot, SnapshotWriter};
pub use reducer::{reduce, Persist};
pub use state::ChatState;
