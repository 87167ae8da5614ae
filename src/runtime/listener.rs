//! Listener registry and non-blocking snapshot fan-out.
//!
//! Every listener owns a bounded mailbox. Dispatch never waits on a
//! subscriber: when a mailbox is full, its newest pending snapshot is
//! replaced by the incoming one, so a slow reader only ever loses
//! intermediate versions, never the latest.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::observability::metrics;

/// Identifies one subscription for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Queued,
    Replaced,
    Gone,
}

struct MailboxState<T> {
    queue: VecDeque<Arc<T>>,
    closed: bool,
    receiver_dropped: bool,
}

struct Mailbox<T> {
    state: Mutex<MailboxState<T>>,
    notify: Notify,
    capacity: usize,
}

impl<T> Mailbox<T> {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(MailboxState {
                queue: VecDeque::new(),
                closed: false,
                receiver_dropped: false,
            }),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, snapshot: Arc<T>) -> Delivery {
        let delivery = {
            let mut state = self.lock();
            if state.closed || state.receiver_dropped {
                return Delivery::Gone;
            }
            if state.queue.len() >= self.capacity {
                state.queue.pop_back();
                state.queue.push_back(snapshot);
                Delivery::Replaced
            } else {
                state.queue.push_back(snapshot);
                Delivery::Queued
            }
        };
        self.notify.notify_one();
        delivery
    }

    fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }
}

/// Receiving side of a subscription.
///
/// Yields every snapshot published after subscription (the current one
/// first, if any). [`recv`](Listener::recv) returns `None` once the manager
/// has stopped or the listener was unsubscribed and nothing is pending.
pub struct Listener<T> {
    id: ListenerId,
    mailbox: Arc<Mailbox<T>>,
}

impl<T> Listener<T> {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Wait for the next snapshot.
    pub async fn recv(&mut self) -> Option<Arc<T>> {
        loop {
            {
                let mut state = self.mailbox.lock();
                if let Some(snapshot) = state.queue.pop_front() {
                    return Some(snapshot);
                }
                if state.closed {
                    return None;
                }
            }
            // notify_one stores a permit, so a push between the check above
            // and this await is not lost.
            self.mailbox.notify.notified().await;
        }
    }

    /// Take the next pending snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<T>> {
        self.mailbox.lock().queue.pop_front()
    }

    /// Whether the manager side has closed this listener.
    pub fn is_closed(&self) -> bool {
        self.mailbox.lock().closed
    }
}

impl<T> Drop for Listener<T> {
    fn drop(&mut self) {
        self.mailbox.lock().receiver_dropped = true;
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

pub(crate) struct Registry<T> {
    listeners: DashMap<ListenerId, Arc<Mailbox<T>>>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: DashMap::new(),
        }
    }

    /// Register a listener, seeding its mailbox with `baseline`.
    pub(crate) fn register(&self, buffer: usize, baseline: Option<Arc<T>>) -> Listener<T> {
        let id = ListenerId::new();
        let mailbox = Arc::new(Mailbox::new(buffer));
        if let Some(snapshot) = baseline {
            mailbox.push(snapshot);
        }
        self.listeners.insert(id, mailbox.clone());
        tracing::debug!(listener = %id, buffer, "Runtime config listener registered");
        Listener { id, mailbox }
    }

    /// A listener that is closed from the start: it yields `baseline` (if
    /// any), then `None`. Never registered, so nothing is dispatched to it.
    pub(crate) fn closed(&self, buffer: usize, baseline: Option<Arc<T>>) -> Listener<T> {
        let mailbox = Arc::new(Mailbox::new(buffer));
        if let Some(snapshot) = baseline {
            mailbox.push(snapshot);
        }
        mailbox.close();
        Listener {
            id: ListenerId::new(),
            mailbox,
        }
    }

    /// Deregister and close a listener. Unknown ids are ignored.
    pub(crate) fn remove(&self, id: ListenerId) {
        if let Some((_, mailbox)) = self.listeners.remove(&id) {
            mailbox.close();
            tracing::debug!(listener = %id, "Runtime config listener removed");
        }
    }

    /// Push `snapshot` into every live mailbox. Returns how many received it.
    pub(crate) fn dispatch(&self, snapshot: &Arc<T>) -> usize {
        let mut delivered = 0;
        self.listeners.retain(|id, mailbox| match mailbox.push(snapshot.clone()) {
            Delivery::Queued => {
                delivered += 1;
                true
            }
            Delivery::Replaced => {
                delivered += 1;
                tracing::debug!(listener = %id, "Listener lagging, replaced pending snapshot");
                metrics::record_listener_lag();
                true
            }
            Delivery::Gone => false,
        });
        delivered
    }

    /// Close and forget every listener.
    pub(crate) fn close_all(&self) {
        self.listeners.retain(|_, mailbox| {
            mailbox.close();
            false
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}
