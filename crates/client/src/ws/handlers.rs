//! Named event handler registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

/// Anything that delivers named push events.
///
/// `on` adds a handler; `off` drops every handler for the event.
pub trait PushSource {
    fn on(&self, event: &str, handler: Handler);
    fn off(&self, event: &str);
}

/// Shared table of handlers keyed by event name.
#[derive(Clone, Default)]
pub struct EventHandlers {
    table: Arc<Mutex<HashMap<String, Vec<Handler>>>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Handler>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Call every handler registered for `event`. Returns how many ran.
    pub fn emit(&self, event: &str, payload: Value) -> usize {
        // Handlers run outside the lock so they may register or remove handlers.
        let handlers: Vec<Handler> = self.lock().get(event).cloned().unwrap_or_default();
        for handler in &handlers {
            handler(payload.clone());
        }
        handlers.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }
}

impl PushSource for EventHandlers {
    fn on(&self, event: &str, handler: Handler) {
        self.lock().entry(event.to_string()).or_default().push(handler);
    }

    fn off(&self, event: &str) {
        self.lock().remove(event);
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.lock();
        let mut map = f.debug_map();
        for (event, handlers) in table.iter() {
            map.entry(event, &handlers.len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_reaches_registered_handlers_only() {
        let handlers = EventHandlers::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        handlers.on("newMessage", Arc::new(move |_: Value| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(handlers.emit("newMessage", json!({})), 1);
        assert_eq!(handlers.emit("newChannel", json!({})), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_removes_all_handlers_for_event() {
        let handlers = EventHandlers::new();
        handlers.on("newMessage", Arc::new(|_: Value| {}));
        handlers.on("newMessage", Arc::new(|_: Value| {}));
        assert_eq!(handlers.handler_count("newMessage"), 2);

        handlers.off("newMessage");
        assert_eq!(handlers.handler_count("newMessage"), 0);
        assert_eq!(handlers.emit("newMessage", Value::Null), 0);
    }
}
