//! Per-collection snapshot fan-out.

use std::sync::{Arc, Mutex, PoisonError};

use event_emitter_rs::EventEmitter;

use crate::word::WordRecord;

/// Listener registry keyed by collection path. Mutators publish the full
/// post-mutation snapshot; every subscriber of that collection receives a
/// copy. Listeners run on the publishing thread with the registry held, so
/// they must not call back into the hub.
pub(crate) struct WatchHub {
    emitter: Arc<Mutex<EventEmitter>>,
}

impl WatchHub {
    pub fn new() -> Self {
        WatchHub {
            emitter: Arc::new(Mutex::new(EventEmitter::new())),
        }
    }

    /// Register a listener for one collection. The returned handle
    /// deregisters it when unsubscribed or dropped.
    pub fn watch<F>(&self, topic: &str, listener: F) -> WatchHandle
    where
        F: Fn(Vec<WordRecord>) + Send + Sync + 'static,
    {
        let listener_id = self
            .emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on(topic, listener);
        WatchHandle {
            emitter: Arc::clone(&self.emitter),
            listener_id: Some(listener_id),
        }
    }

    pub fn publish(&self, topic: &str, snapshot: &[WordRecord]) {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(topic, snapshot.to_vec());
    }
}

/// Live subscription to one collection; unsubscribe by dropping or calling
/// [`WatchHandle::unsubscribe`].
pub struct WatchHandle {
    emitter: Arc<Mutex<EventEmitter>>,
    listener_id: Option<String>,
}

impl WatchHandle {
    /// Stop receiving snapshots.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(id) = self.listener_id.take() {
            self.emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove_listener(&id);
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.remove();
    }
}
