//! Subscription hook: binds a panel's lifetime to bus subscriptions and
//! turns each delivered event into exactly one notification.

use log::{debug, info};
use pulse_bus::{BusError, EventBus, EventKind, Subscription};
use pulse_clock::Clock;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use super::store::{Notification, StoreHandle};

pub struct NotificationFeed;

impl NotificationFeed {
    /// Subscribe to `kinds` on `bus`. Each delivered event is stamped with
    /// `clock.now()`, given a fresh id and inserted into `store`.
    ///
    /// Subscriptions live exactly as long as the returned [`MountedFeed`].
    pub fn mount(
        name: &str,
        bus: &EventBus,
        kinds: &[EventKind],
        store: StoreHandle,
        clock: Arc<dyn Clock>,
    ) -> Result<MountedFeed, BusError> {
        let delivered = Rc::new(Cell::new(0u64));
        let mut subscriptions = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            let store = store.clone();
            let clock = clock.clone();
            let delivered = delivered.clone();
            let subscription = bus.subscribe(kind, move |event| {
                store.insert(Notification::from_event(event, clock.now()));
                delivered.set(delivered.get() + 1);
            })?;
            subscriptions.push(subscription);
        }

        info!("Mounted feed '{}' on {} kinds", name, kinds.len());
        Ok(MountedFeed {
            name: name.to_string(),
            subscriptions,
            delivered,
        })
    }
}

/// A mounted feed. Dropping it unmounts.
pub struct MountedFeed {
    name: String,
    subscriptions: Vec<Subscription>,
    delivered: Rc<Cell<u64>>,
}

impl MountedFeed {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Events projected into the store so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Explicit form of dropping the feed.
    pub fn unmount(self) {}
}

impl Drop for MountedFeed {
    fn drop(&mut self) {
        let released = self.subscriptions.len();
        self.subscriptions.clear();
        debug!(
            "Unmounted feed '{}' ({} subscriptions, {} delivered)",
            self.name,
            released,
            self.delivered.get()
        );
    }
}
