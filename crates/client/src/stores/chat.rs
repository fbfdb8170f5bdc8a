//! The chat store container.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::actions::ChatAction;
use super::persist::{load_snapshot, SnapshotWriter};
use super::reducer::reduce;
use super::state::ChatState;
use crate::storage::{MemoryStorage, Storage};

/// Shared handle to the chat state.
///
/// Cloning is cheap; all clones see the same state. Every change goes through
/// [`ChatStore::dispatch`], which reduces, writes the snapshot and then bumps
/// the revision observed by [`ChatStore::subscribe`].
#[derive(Clone)]
pub struct ChatStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<ChatState>,
    snapshots: SnapshotWriter,
    revision: watch::Sender<u64>,
}

impl ChatStore {
    /// Start from the built-in default channels.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_state(ChatState::default(), storage)
    }

    /// Start from the last persisted snapshot.
    pub fn seeded(storage: Arc<dyn Storage>) -> Self {
        let state = load_snapshot(storage.as_ref());
        Self::with_state(state, storage)
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn with_state(state: ChatState, storage: Arc<dyn Storage>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                snapshots: SnapshotWriter::new(storage),
                revision,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dispatch(&self, action: ChatAction) {
        crate::log_debug!("dispatch {}", action.type_name());
        {
            let mut state = self.lock();
            let persist = reduce(&mut state, &action);
            if persist.any() {
                self.inner.snapshots.write(&state, persist);
            }
        }
        self.inner.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Copy of the current state.
    pub fn state(&self) -> ChatState {
        self.lock().clone()
    }

    /// Read a projection of the state without cloning all of it.
    pub fn select<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&self.lock())
    }

    /// Receiver that changes after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        self.inner.snapshots.storage()
    }
}
