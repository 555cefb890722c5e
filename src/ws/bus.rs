//! Publish/subscribe registry keyed by event name.
//!
//! The bus is independent of any socket: the live transport publishes into
//! it, and tests publish into it directly. Handlers for one event run in
//! registration order, and events run in the order they are published;
//! the bus never reorders.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`EventBus::on`]; pass it to [`EventBus::off`] to
/// unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    event: String,
    id: u64,
}

#[derive(Default)]
pub struct EventBus {
    topics: DashMap<String, Vec<(u64, Handler)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    pub fn on(
        &self,
        event: &str,
        handler: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.topics
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription { event: event.to_string(), id }
    }

    pub fn off(&self, subscription: &Subscription) {
        if let Some(mut handlers) = self.topics.get_mut(&subscription.event) {
            handlers.retain(|(id, _)| *id != subscription.id);
        }
    }

    /// Deliver `payload` to every subscriber of `event`, synchronously.
    pub fn publish(&self, event: &str, payload: &Value) {
        // Snapshot the handler list first so a handler may subscribe or
        // unsubscribe without deadlocking the registry.
        let handlers: Vec<Handler> = match self.topics.get(event) {
            Some(entry) => entry.iter().map(|(_, h)| h.clone()).collect(),
            None => return,
        };
        for handler in handlers {
            handler(payload);
        }
    }
}
