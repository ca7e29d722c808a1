//! Per-session observer registry.
//!
//! Every [`Var`](super::Var) belongs to one [`Session`]. Observers are
//! registered here, keyed by the id of the var they watch, instead of being
//! stored on the vars themselves. Dropping the last `Session` handle (or
//! calling [`Session::dispose`]) releases every callback at once, together
//! with whatever the callbacks captured.
//!
//! Vars only keep a `Weak` reference to the session, so callbacks may freely
//! capture vars and views without creating reference cycles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

/// Identifies one var inside a session.
pub(crate) type SourceId = u64;

/// Handle returned by [`View::subscribe`](super::View::subscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Observer {
    id: ObserverId,
    callback: Rc<dyn Fn()>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: HashMap<SourceId, Vec<Observer>>,
    disposed: bool,
}

impl Registry {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub(crate) struct SessionInner {
    registry: RefCell<Registry>,
}

impl SessionInner {
    pub(crate) fn is_disposed(&self) -> bool {
        self.registry.borrow().disposed
    }

    /// Run every observer of `source`, in registration order.
    ///
    /// Callbacks are cloned out first so they may write to other vars (or
    /// register new observers) without re-entering a live borrow.
    pub(crate) fn notify(&self, source: SourceId) {
        let callbacks: Vec<Rc<dyn Fn()>> = {
            let registry = self.registry.borrow();
            match registry.observers.get(&source) {
                Some(observers) => observers.iter().map(|o| Rc::clone(&o.callback)).collect(),
                None => return,
            }
        };
        trace!("notifying {} observer(s) of source {}", callbacks.len(), source);
        for callback in callbacks {
            callback();
        }
    }
}

/// Owner of all reactive state of one client session.
///
/// Cloning a `Session` creates another handle to the same registry.
#[derive(Clone, Default)]
pub struct Session {
    inner: Rc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.borrow();
        f.debug_struct("Session")
            .field("observers", &registry.observers.values().map(Vec::len).sum::<usize>())
            .field("disposed", &registry.disposed)
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn allocate_source(&self) -> SourceId {
        self.inner.registry.borrow_mut().allocate()
    }

    /// Register `callback` for every source in `sources` under a single id.
    ///
    /// Registering on a disposed session returns an id but stores nothing.
    pub(crate) fn observe(&self, sources: &[SourceId], callback: Rc<dyn Fn()>) -> ObserverId {
        let mut registry = self.inner.registry.borrow_mut();
        let id = ObserverId(registry.allocate());
        if registry.disposed {
            return id;
        }
        for source in sources {
            registry.observers.entry(*source).or_default().push(Observer {
                id,
                callback: Rc::clone(&callback),
            });
        }
        id
    }

    /// Remove a registration made through [`View::subscribe`](super::View::subscribe).
    ///
    /// Returns false if the id was unknown or already removed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let removed: Vec<Observer> = {
            let mut registry = self.inner.registry.borrow_mut();
            let mut removed = Vec::new();
            for observers in registry.observers.values_mut() {
                let (gone, kept): (Vec<Observer>, Vec<Observer>) =
                    std::mem::take(observers).into_iter().partition(|o| o.id == id);
                *observers = kept;
                removed.extend(gone);
            }
            registry.observers.retain(|_, observers| !observers.is_empty());
            removed
        };
        // Dropped here, after the borrow ends.
        !removed.is_empty()
    }

    /// Number of live registrations (one per watched source).
    pub fn observer_count(&self) -> usize {
        self.inner
            .registry
            .borrow()
            .observers
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Tear down every observer. Vars keep their values but stop notifying,
    /// and async results that settle afterwards are dropped.
    pub fn dispose(&self) {
        let observers = {
            let mut registry = self.inner.registry.borrow_mut();
            registry.disposed = true;
            std::mem::take(&mut registry.observers)
        };
        debug!(
            "session disposed, released {} observer(s)",
            observers.values().map(Vec::len).sum::<usize>()
        );
        drop(observers);
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}
