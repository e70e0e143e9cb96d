//! Synchronous publish/subscribe bus.
//!
//! Single-threaded by construction (`Rc`, not `Send`). Handlers run inside
//! `publish`, in the order they were registered. The bus snapshots the
//! matching registrations before delivering, so a handler registered while
//! a publish is running never sees that event, and a subscription dropped
//! while a publish is running is skipped from that point on.

use crate::error::BusError;
use crate::types::{Event, EventKind};
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Handler = Rc<dyn Fn(&Event)>;

struct Registration {
    id: u64,
    /// `None` means every kind.
    kind: Option<EventKind>,
    alive: Rc<Cell<bool>>,
    handler: Handler,
}

impl Registration {
    #[inline]
    fn matches(&self, kind: EventKind) -> bool {
        self.kind.is_none_or(|k| k == kind)
    }
}

#[derive(Default)]
struct Inner {
    next_id: Cell<u64>,
    registrations: RefCell<Vec<Registration>>,
    disposed: Cell<bool>,
}

/// Shared handle to an in-process event bus. Clones point at the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<Inner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Result<Subscription, BusError>
    where
        F: Fn(&Event) + 'static,
    {
        self.register(Some(kind), Rc::new(handler))
    }

    /// Register `handler` for every kind.
    pub fn subscribe_all<F>(&self, handler: F) -> Result<Subscription, BusError>
    where
        F: Fn(&Event) + 'static,
    {
        self.register(None, Rc::new(handler))
    }

    fn register(&self, kind: Option<EventKind>, handler: Handler) -> Result<Subscription, BusError> {
        if self.inner.disposed.get() {
            return Err(BusError::Disposed);
        }

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let alive = Rc::new(Cell::new(true));

        self.inner.registrations.borrow_mut().push(Registration {
            id,
            kind,
            alive: alive.clone(),
            handler,
        });
        debug!(
            "Subscribed #{} to {}",
            id,
            kind.map(|k| k.as_str()).unwrap_or("*")
        );

        Ok(Subscription {
            id,
            alive,
            bus: Rc::downgrade(&self.inner),
        })
    }

    /// Deliver `event` to every live handler for its kind.
    /// Returns how many handlers ran.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();

        // Snapshot, then release the borrow so handlers may (un)subscribe
        // or publish again.
        let targets: Vec<(Rc<Cell<bool>>, Handler)> = self
            .inner
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.matches(kind))
            .map(|r| (r.alive.clone(), r.handler.clone()))
            .collect();

        let mut delivered = 0;
        for (alive, handler) in targets {
            if !alive.get() {
                continue;
            }
            handler(event);
            delivered += 1;
        }

        trace!("Published {} to {} handlers", kind, delivered);
        delivered
    }

    /// Number of live handlers that would receive an event of `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.matches(kind) && r.alive.get())
            .count()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Drop every registration. Later publishes reach nobody and later
    /// subscribes fail with [`BusError::Disposed`].
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let drained: Vec<Registration> = self.inner.registrations.borrow_mut().drain(..).collect();
        for registration in &drained {
            registration.alive.set(false);
        }
        debug!("Event bus disposed ({} registrations released)", drained.len());
    }
}

/// RAII guard for a bus registration. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    alive: Rc<Cell<bool>>,
    bus: Weak<Inner>,
}

impl Subscription {
    /// False once unsubscribed or the bus was disposed.
    pub fn is_active(&self) -> bool {
        self.alive.get()
    }

    /// Explicit form of dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.alive.replace(false) {
            return;
        }
        if let Some(inner) = self.bus.upgrade() {
            // Handlers may own other guards; drop them outside the borrow.
            let removed: Vec<Registration> = {
                let mut registrations = inner.registrations.borrow_mut();
                let (removed, kept) = registrations.drain(..).partition(|r| r.id == self.id);
                *registrations = kept;
                removed
            };
            drop(removed);
            debug!("Unsubscribed #{}", self.id);
        }
    }
}
