//! Listener registry keyed by resource.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// The resources the store holds a slice for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    Users,
    Activities,
    Tracks,
    Recap,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 4] = [
        ResourceKey::Users,
        ResourceKey::Activities,
        ResourceKey::Tracks,
        ResourceKey::Recap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKey::Users => "users",
            ResourceKey::Activities => "activities",
            ResourceKey::Tracks => "tracks",
            ResourceKey::Recap => "recap",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change callback. Identity is the `Rc` allocation: subscribing the same
/// `Rc` twice under one key registers it once.
pub type Listener = Rc<dyn Fn(ResourceKey)>;

/// Wrap a closure as a [`Listener`].
pub fn listener(f: impl Fn(ResourceKey) + 'static) -> Listener {
    Rc::new(f)
}

#[derive(Default)]
pub struct Subscriptions {
    listeners: RefCell<HashMap<ResourceKey, Vec<Listener>>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `key`. Returns false if it was already there.
    pub fn subscribe(&self, key: ResourceKey, listener: &Listener) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let entry = listeners.entry(key).or_default();
        if entry.iter().any(|l| Rc::ptr_eq(l, listener)) {
            return false;
        }
        entry.push(listener.clone());
        true
    }

    /// Remove `listener` from `key`. Returns false if it was not registered.
    pub fn unsubscribe(&self, key: ResourceKey, listener: &Listener) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(entry) = listeners.get_mut(&key) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|l| !Rc::ptr_eq(l, listener));
        let removed = entry.len() != before;
        if entry.is_empty() {
            listeners.remove(&key);
        }
        removed
    }

    /// Call every listener registered for `key`, in registration order.
    ///
    /// Listeners run against a snapshot taken before the first call, so they
    /// may subscribe or unsubscribe without disturbing this round.
    pub fn notify(&self, key: ResourceKey) {
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(&key) {
            Some(entry) => entry.clone(),
            None => return,
        };
        for listener in snapshot {
            listener(key);
        }
    }

    pub fn listener_count(&self, key: ResourceKey) -> usize {
        self.listeners.borrow().get(&key).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}
