//! Zero-payload, in-process broadcast telling views that the stored
//! documents changed.
//!
//! Listeners run synchronously on the emitting task, in registration order.
//! `emit` works on a snapshot of the registry taken when it starts and holds
//! no lock while listeners run, so listeners may subscribe, unsubscribe or
//! emit again. Listeners added during an emission are not called by it. A
//! listener unsubscribed during an emission is skipped if it has not been
//! reached yet.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

use parking_lot::Mutex;
use tracing::{debug, error, warn};

type Listener = dyn Fn() -> anyhow::Result<()> + Send + Sync;

struct Subscriber {
    id: u64,
    active: AtomicBool,
    listener: Box<Listener>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Arc<Subscriber>>,
}

/// Cheap to clone; clones share one registry.
#[derive(Clone, Default)]
pub struct UpdateNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl UpdateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for future emissions. Past emissions are not replayed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        let subscriber = Arc::new(Subscriber {
            id,
            active: AtomicBool::new(true),
            listener: Box::new(listener),
        });
        registry.subscribers.push(Arc::clone(&subscriber));
        debug!(subscriber = id, "notifier: listener subscribed");

        Subscription {
            subscriber,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        subscription.unsubscribe();
    }

    /// Calls every listener registered when the emission starts, once each.
    /// Returns how many listeners were called.
    pub fn emit(&self) -> usize {
        let snapshot = self.registry.lock().subscribers.clone();
        let mut delivered = 0;

        for subscriber in snapshot {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }
            delivered += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| (subscriber.listener)())) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(subscriber = subscriber.id, error = %error, "notifier: listener failed");
                }
                Err(_) => {
                    error!(subscriber = subscriber.id, "notifier: listener panicked");
                }
            }
        }

        debug!(delivered, "notifier: update emitted");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

/// Handle returned by [`UpdateNotifier::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    subscriber: Arc<Subscriber>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Idempotent.
    pub fn unsubscribe(&self) {
        if !self.subscriber.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            let id = self.subscriber.id;
            registry.lock().subscribers.retain(|s| s.id != id);
        }
        debug!(subscriber = self.subscriber.id, "notifier: listener unsubscribed");
    }

    pub fn is_active(&self) -> bool {
        self.subscriber.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
#[path = "tests/notifier_tests.rs"]
mod tests;
