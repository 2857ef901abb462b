//! Named-event publish/subscribe composed with a property bag.
//!
//! Independent of the error core: nothing in `types` or `instance` uses it.
//!
//! Listeners are invoked synchronously, in subscription order, on the
//! emitting thread. The listener list is snapshotted before dispatch, so a
//! listener may subscribe or unsubscribe without deadlocking.
//!
//! # Example
//!
//! ```rust
//! use taxon_errors::EventEmitter;
//! use serde_json::json;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let emitter = EventEmitter::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! emitter.on("data", move |_| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! assert_eq!(emitter.emit("data", &json!(1)), 1);
//! assert_eq!(seen.load(Ordering::Relaxed), 1);
//! ```

use crate::object::{PropertyBag, ToJson};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct Listener {
    id: ListenerId,
    once: bool,
    handler: Handler,
}

type Listeners = SmallVec<[Listener; 2]>;

/// Synchronous event emitter with a property bag.
pub struct EventEmitter {
    listeners: RwLock<HashMap<String, Listeners>>,
    next_id: AtomicU64,
    properties: PropertyBag,
}

impl EventEmitter {
    /// Create an emitter with no properties.
    pub fn new() -> Self {
        Self::with_properties(PropertyBag::new())
    }

    /// Create an emitter with default properties.
    pub fn with_properties(properties: PropertyBag) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            properties,
        }
    }

    #[inline]
    fn read_listeners(&self) -> RwLockReadGuard<'_, HashMap<String, Listeners>> {
        match self.listeners.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_listeners(&self) -> RwLockWriteGuard<'_, HashMap<String, Listeners>> {
        match self.listeners.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn subscribe<F>(&self, event: &str, once: bool, handler: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write_listeners()
            .entry(event.to_owned())
            .or_default()
            .push(Listener {
                id,
                once,
                handler: Arc::new(handler),
            });
        id
    }

    /// Subscribe to `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe(event, false, handler)
    }

    /// Subscribe to the next occurrence of `event` only.
    pub fn once<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe(event, true, handler)
    }

    /// Unsubscribe. Returns false if the listener was not registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.write_listeners();
        let Some(list) = listeners.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|listener| listener.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Publish `payload` to every listener of `event`.
    ///
    /// Returns the number of listeners invoked. A `once` listener is claimed
    /// and removed under the write lock, so concurrent emits invoke it at
    /// most once between them.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let persistent_only = {
            let listeners = self.read_listeners();
            let Some(list) = listeners.get(event) else {
                return 0;
            };
            (!list.iter().any(|listener| listener.once)).then(|| list.clone())
        };
        let snapshot = match persistent_only {
            Some(snapshot) => snapshot,
            None => self.claim_snapshot(event),
        };

        trace!(event, listeners = snapshot.len(), "emitting event");
        for listener in &snapshot {
            (listener.handler)(payload);
        }
        snapshot.len()
    }

    /// Snapshot `event`'s listeners and drop its `once` entries in one step.
    fn claim_snapshot(&self, event: &str) -> Listeners {
        let mut listeners = self.write_listeners();
        let Some(list) = listeners.get_mut(event) else {
            return Listeners::new();
        };
        let snapshot = list.clone();
        list.retain(|listener| !listener.once);
        if list.is_empty() {
            listeners.remove(event);
        }
        snapshot
    }

    /// Number of listeners subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.read_listeners().get(event).map_or(0, |list| list.len())
    }

    /// Remove every listener of `event`, or of all events when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut listeners = self.write_listeners();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    /// The emitter's properties.
    #[inline]
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Mutable access to the emitter's properties.
    #[inline]
    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ToJson for EventEmitter {
    type Output = Value;

    fn to_json(&self) -> Value {
        self.properties.to_json()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<(String, usize)> = self
            .read_listeners()
            .iter()
            .map(|(event, list)| (event.clone(), list.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("events", &events)
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Barrier, Mutex};
    use std::thread;

    #[test]
    fn listeners_run_in_subscription_order() {
        let emitter = EventEmitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            emitter.on("tick", move |payload| {
                log.lock().unwrap().push(format!("{tag}:{payload}"));
            });
        }

        assert_eq!(emitter.emit("tick", &json!(7)), 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:7", "second:7"]);
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        emitter.once("ready", move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(emitter.emit("ready", &Value::Null), 1);
        assert_eq!(emitter.emit("ready", &Value::Null), 0);
        assert_eq!(hits.load(Ordering::Relaxed), 1);
        assert_eq!(emitter.listener_count("ready"), 0);
    }

    #[test]
    fn concurrent_emits_fire_a_once_listener_a_single_time() {
        for _ in 0..200 {
            let emitter = Arc::new(EventEmitter::new());
            let hits = Arc::new(AtomicU64::new(0));
            let counter = Arc::clone(&hits);
            emitter.once("x", move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            });

            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let emitter = Arc::clone(&emitter);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        emitter.emit("x", &Value::Null)
                    })
                })
                .collect();
            let invoked: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

            assert_eq!(invoked, 1);
            assert_eq!(hits.load(Ordering::Relaxed), 1);
            assert_eq!(emitter.listener_count("x"), 0);
        }
    }

    #[test]
    fn once_and_persistent_listeners_mix() {
        let emitter = EventEmitter::new();
        emitter.on("e", |_| {});
        emitter.once("e", |_| {});

        assert_eq!(emitter.emit("e", &Value::Null), 2);
        assert_eq!(emitter.emit("e", &Value::Null), 1);
        assert_eq!(emitter.listener_count("e"), 1);
    }

    #[test]
    fn off_unsubscribes_only_the_given_listener() {
        let emitter = EventEmitter::new();
        let a = emitter.on("e", |_| {});
        let _b = emitter.on("e", |_| {});

        assert!(emitter.off("e", a));
        assert!(!emitter.off("e", a));
        assert_eq!(emitter.listener_count("e"), 1);

        emitter.remove_all_listeners(None);
        assert_eq!(emitter.listener_count("e"), 0);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let emitter = Arc::new(EventEmitter::new());
        let inner = Arc::clone(&emitter);
        emitter.on("grow", move |_| {
            inner.on("grow", |_| {});
        });

        assert_eq!(emitter.emit("grow", &Value::Null), 1);
        assert_eq!(emitter.listener_count("grow"), 2);
    }

    #[test]
    fn to_json_exposes_properties() {
        let mut emitter = EventEmitter::with_properties(PropertyBag::from_value(json!({ "id": 1 })));
        emitter.properties_mut().set("state", "open");

        assert_eq!(emitter.to_json(), json!({ "id": 1, "state": "open" }));
    }
}
