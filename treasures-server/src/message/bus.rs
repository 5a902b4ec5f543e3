//! Change bus implementation
//!
//! ```text
//!  repository ── publish() ──▶ ChangeBus ──┬──▶ handlers (sync, in registration order)
//!                                          └──▶ broadcast::Sender ──▶ receivers (SSE)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;
use shared::message::{ChangeAction, ChangeEvent, ResourceKind};
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

pub type ChangeHandler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Per-resource version counter
///
/// Every published event gets the next version of its resource, starting at 1.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<ResourceKind, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new version
    pub fn increment(&self, resource: ResourceKind) -> u64 {
        let mut entry = self.versions.entry(resource).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version, 0 if nothing was published yet
    pub fn get(&self, resource: ResourceKind) -> u64 {
        self.versions.get(&resource).map(|v| *v).unwrap_or(0)
    }
}

struct BusInner {
    tx: broadcast::Sender<ChangeEvent>,
    handlers: RwLock<Vec<(u64, ChangeHandler)>>,
    next_handler_id: AtomicU64,
    versions: ResourceVersions,
}

/// Process-wide typed publish/subscribe
#[derive(Clone)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("handlers", &self.handler_count())
            .field("receivers", &self.inner.tx.receiver_count())
            .finish()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(BusInner {
                tx,
                handlers: RwLock::new(Vec::new()),
                next_handler_id: AtomicU64::new(1),
                versions: ResourceVersions::new(),
            }),
        }
    }

    /// Stamp the next resource version on `event` and deliver it to every
    /// handler registered right now, then to every open receiver.
    pub fn publish(&self, mut event: ChangeEvent) -> ChangeEvent {
        event.version = self.inner.versions.increment(event.resource);

        // snapshot so handlers may (un)subscribe while being called
        let handlers: Vec<ChangeHandler> = self
            .inner
            .handlers
            .read()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(&event);
        }

        // no receivers is not an error
        let _ = self.inner.tx.send(event.clone());

        tracing::debug!(
            resource = %event.resource,
            action = %event.action,
            id = ?event.id,
            version = event.version,
            "Change published"
        );
        event
    }

    /// Shorthand for building and publishing an event
    pub fn notify(
        &self,
        resource: ResourceKind,
        action: ChangeAction,
        id: Option<String>,
    ) -> ChangeEvent {
        self.publish(ChangeEvent::new(resource, action, id))
    }

    /// Register a synchronous handler. It stays registered until the
    /// returned [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_handler_id.fetch_add(1, Ordering::Relaxed);
        self.inner.handlers.write().push((id, Arc::new(handler)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
            active: true,
        }
    }

    /// Async receiver for stream consumers
    pub fn receiver(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.tx.subscribe()
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.read().len()
    }

    pub fn version(&self, resource: ResourceKind) -> u64 {
        self.inner.versions.get(resource)
    }
}

/// Handle returned by [`ChangeBus::subscribe`]
#[must_use = "dropping a Subscription unsubscribes the handler"]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
    active: bool,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Keep the handler registered for the lifetime of the bus
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.bus.upgrade() {
            inner.handlers.write().retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
