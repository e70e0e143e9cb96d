//! Bounded, newest-first notification queue.
//!
//! # Invariants
//! - Entries are ordered by arrival, newest at the front.
//! - `len() <= capacity` after every operation; overflow evicts from the
//!   back (oldest first).
//! - `read` only ever goes from false to true.
//! - Every operation is total: unknown ids are no-ops, never errors.

use chrono::{DateTime, Utc};
use log::debug;
use pulse_bus::{Event, EventKind};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::rc::Rc;
use uuid::Uuid;

use super::priority::Quadrant;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreCapacity {
    Bounded(NonZeroUsize),
    Unbounded,
}

impl StoreCapacity {
    pub fn limit(&self) -> Option<usize> {
        match self {
            StoreCapacity::Bounded(n) => Some(n.get()),
            StoreCapacity::Unbounded => None,
        }
    }
}

impl Default for StoreCapacity {
    fn default() -> Self {
        StoreCapacity::Bounded(DEFAULT_CAPACITY)
    }
}

/// Store-level projection of an [`Event`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Client-generated render/removal key. Not a business id.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub kind: EventKind,
    pub title: String,
    pub body: String,
    /// Only set for task updates.
    pub quadrant: Option<Quadrant>,
}

impl Notification {
    pub fn new(
        id: impl Into<String>,
        kind: EventKind,
        title: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            read: false,
            kind,
            title: title.into(),
            body: body.into(),
            quadrant: None,
        }
    }

    /// Project an event received at `created_at`, with a fresh random id.
    pub fn from_event(event: &Event, created_at: DateTime<Utc>) -> Self {
        let (title, body) = event.summary();
        let mut notification = Self::new(
            Uuid::new_v4().simple().to_string(),
            event.kind(),
            title,
            body,
            created_at,
        );
        notification.quadrant = Quadrant::for_event(event);
        notification
    }
}

#[derive(Debug, Default)]
pub struct NotificationStore {
    entries: VecDeque<Notification>,
    capacity: StoreCapacity,
}

impl NotificationStore {
    pub fn new(capacity: StoreCapacity) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Prepend, then evict from the tail until within capacity.
    pub fn insert(&mut self, notification: Notification) {
        self.entries.push_front(notification);

        if let Some(limit) = self.capacity.limit() {
            while self.entries.len() > limit {
                if let Some(evicted) = self.entries.pop_back() {
                    debug!("Evicted notification {} ({})", evicted.id, evicted.kind);
                }
            }
        }
    }

    /// Returns whether anything changed.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        }
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|n| n.id == id) {
            Some(index) => self.entries.remove(index).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns how many entries flipped to read.
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for n in self.entries.iter_mut().filter(|n| !n.read) {
            n.read = true;
            flipped += 1;
        }
        flipped
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }
}

/// Owned copy of the store for rendering.
#[derive(Clone, Debug, Default)]
pub struct StoreSnapshot {
    pub entries: Vec<Notification>,
    pub unread: usize,
}

/// Shared access to the one live store. All clones mutate the same list,
/// so handlers created at mount time never act on a stale copy.
#[derive(Clone)]
pub struct StoreHandle {
    store: Rc<RefCell<NotificationStore>>,
    version: Rc<Cell<u64>>,
}

impl StoreHandle {
    /// Apply `f` to the live store. Bumps the version so the render loop
    /// knows to redraw.
    pub fn update<R>(&self, f: impl FnOnce(&mut NotificationStore) -> R) -> R {
        let result = f(&mut self.store.borrow_mut());
        self.version.set(self.version.get() + 1);
        result
    }

    pub fn insert(&self, notification: Notification) {
        self.update(|store| store.insert(notification));
    }

    pub fn mark_read(&self, id: &str) -> bool {
        self.update(|store| store.mark_read(id))
    }

    pub fn remove(&self, id: &str) -> bool {
        self.update(|store| store.remove(id))
    }

    pub fn clear(&self) {
        self.update(NotificationStore::clear);
    }

    pub fn mark_all_read(&self) -> usize {
        self.update(NotificationStore::mark_all_read)
    }

    /// Read-only view without copying.
    pub fn with<R>(&self, f: impl FnOnce(&NotificationStore) -> R) -> R {
        f(&self.store.borrow())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.with(|store| StoreSnapshot {
            entries: store.iter().cloned().collect(),
            unread: store.unread_count(),
        })
    }

    /// Incremented on every mutation attempt.
    pub fn version(&self) -> u64 {
        self.version.get()
    }
}

/// Single owner of the notification store.
pub struct NotificationCenter {
    handle: StoreHandle,
}

impl NotificationCenter {
    pub fn new(capacity: StoreCapacity) -> Self {
        Self {
            handle: StoreHandle {
                store: Rc::new(RefCell::new(NotificationStore::new(capacity))),
                version: Rc::new(Cell::new(0)),
            },
        }
    }

    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.handle.snapshot()
    }
}
