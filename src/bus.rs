//! Typed publish/subscribe channel for dashboard notifications.
//!
//! Delivery is synchronous and on the caller's thread: `publish` invokes every
//! listener registered at the time of the call exactly once, then returns.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::types::{DashEvent, Scope};

/// Handle returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }
}

type Listener = Rc<dyn Fn(&DashEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&DashEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Listen to scope changes only.
    pub fn subscribe_scope(&self, listener: impl Fn(&Scope) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let DashEvent::ScopeChanged { scope } = event {
                listener(scope);
            }
        })
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Deliver `event` to every current listener. Returns how many were invoked.
    ///
    /// Listeners may subscribe, unsubscribe or publish from inside the
    /// callback; such changes take effect for the next `publish`.
    pub fn publish(&self, event: &DashEvent) -> usize {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}
