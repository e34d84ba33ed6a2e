//! Observer registry and ordered event delivery
//!
//! [`EventDispatcher`] holds observers weakly, in registration order, and
//! delivers each event to every live observer before moving on to the next
//! event. A panicking observer is logged and skipped; the remaining
//! observers still receive the event.
//!
//! Events reach the dispatcher through an unbounded queue (the "outbox")
//! drained by a single task, so a slow observer delays later events but
//! never blocks the transport or a caller's setter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::events::{SubscriberEvent, SubscriberEventHandler};

/// Returned by [`EventDispatcher::add_observer`]; pass it back to remove the
/// observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(Uuid);

impl ObserverHandle {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

struct ObserverEntry {
    handle: ObserverHandle,
    observer: Weak<dyn SubscriberEventHandler>,
}

pub struct EventDispatcher {
    observers: RwLock<Vec<ObserverEntry>>,
    closed: AtomicBool,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Registers `observer` without taking ownership of it.
    ///
    /// Registering the same observer twice yields two handles and two
    /// deliveries per event.
    pub fn add_observer(&self, observer: &Arc<dyn SubscriberEventHandler>) -> ObserverHandle {
        let handle = ObserverHandle(Uuid::new_v4());
        self.observers.write().push(ObserverEntry {
            handle,
            observer: Arc::downgrade(observer),
        });
        tracing::debug!(observer = %handle.0, "observer registered");
        handle
    }

    /// Returns false if the handle was unknown or already removed.
    pub fn remove_observer(&self, handle: ObserverHandle) -> bool {
        let mut observers = self.observers.write();
        match observers.iter().position(|e| e.handle == handle) {
            Some(pos) => {
                observers.remove(pos);
                tracing::debug!(observer = %handle.0, "observer removed");
                true
            }
            None => false,
        }
    }

    /// Live observers only; dropped ones no longer count.
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .iter()
            .filter(|e| e.observer.strong_count() > 0)
            .count()
    }

    /// Number of live observers that opted in to audio level events.
    pub fn audio_level_listeners(&self) -> usize {
        self.live_observers()
            .iter()
            .filter(|o| o.wants_audio_levels())
            .count()
    }

    /// Stops all further deliveries, including the rest of an event that is
    /// being delivered right now.
    ///
    /// Does not wait for the delivery task. A callback already running keeps
    /// running, and on a multi-threaded runtime a callback that passed the
    /// closed check just before this call may still start once.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn live_observers(&self) -> Vec<Arc<dyn SubscriberEventHandler>> {
        let mut observers = self.observers.write();
        observers.retain(|e| e.observer.strong_count() > 0);
        observers.iter().filter_map(|e| e.observer.upgrade()).collect()
    }

    /// Delivers `event` to every live observer in registration order.
    pub async fn dispatch(&self, event: SubscriberEvent) {
        let observers = self.live_observers();
        let kind = event.kind.name();

        for observer in observers {
            if self.is_closed() {
                return;
            }

            let fut = observer.on_subscriber_event(event.clone());
            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                tracing::error!(
                    subscription = %event.subscription_id,
                    event = kind,
                    panic = %info,
                    "observer panicked while handling event"
                );
            }
        }
    }

    /// Spawns the task that drains `outbox` into [`dispatch`](Self::dispatch).
    ///
    /// The task ends when every sender is dropped or the dispatcher is closed.
    pub fn spawn_pump(
        self: &Arc<Self>,
        mut outbox: mpsc::UnboundedReceiver<SubscriberEvent>,
    ) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = outbox.recv().await {
                if dispatcher.is_closed() {
                    break;
                }
                dispatcher.dispatch(event).await;
            }
            tracing::trace!("event pump stopped");
        })
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("observers", &self.observers.read().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
