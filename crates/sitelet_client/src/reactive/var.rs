use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::session::{Session, SessionInner, SourceId};
use super::view::{View, ViewNode};

pub(crate) struct VarInner<T> {
    id: SourceId,
    value: RefCell<T>,
    version: Cell<u64>,
    session: Weak<SessionInner>,
}

/// A mutable, versioned value owned by a [`Session`].
///
/// Every write bumps the version by one, even when the new value equals the
/// old one, and then runs the observers registered for this var.
///
/// Cloning a `Var` creates another handle to the same value.
pub struct Var<T> {
    inner: Rc<VarInner<T>>,
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: 'static> Var<T> {
    pub fn new(session: &Session, initial: T) -> Self {
        Self {
            inner: Rc::new(VarInner {
                id: session.allocate_source(),
                value: RefCell::new(initial),
                version: Cell::new(0),
                session: session.downgrade(),
            }),
        }
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutate in place, then bump the version and notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value);
        }
        self.inner.version.set(self.inner.version.get() + 1);
        if let Some(session) = self.inner.session.upgrade() {
            session.notify(self.inner.id);
        }
    }

    /// False once the owning session is disposed or dropped.
    pub fn is_attached(&self) -> bool {
        self.inner
            .session
            .upgrade()
            .is_some_and(|session| !session.is_disposed())
    }
}

impl<T: Clone + 'static> Var<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// The value together with the version it was written under.
    pub fn snapshot(&self) -> (T, u64) {
        (self.get(), self.version())
    }

    pub fn view(&self) -> View<T> {
        View::from_node(Rc::clone(&self.inner) as Rc<dyn ViewNode<T>>)
    }
}

impl<T: Clone + 'static> ViewNode<T> for VarInner<T> {
    fn get(&self) -> T {
        self.value.borrow().clone()
    }

    fn version(&self) -> u64 {
        self.version.get()
    }

    fn sources(&self, out: &mut Vec<SourceId>) {
        out.push(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bumps_version_even_for_equal_values() {
        let session = Session::new();
        let var = Var::new(&session, 1);
        assert_eq!(var.snapshot(), (1, 0));

        var.set(1);
        var.set(2);
        assert_eq!(var.snapshot(), (2, 2));
    }

    #[test]
    fn update_mutates_in_place() {
        let session = Session::new();
        let var = Var::new(&session, String::from("ab"));
        var.update(|s| s.push('c'));
        assert_eq!(var.get(), "abc");
        assert_eq!(var.with(String::len), 3);
    }

    #[test]
    fn observers_run_in_registration_order() {
        let session = Session::new();
        let var = Var::new(&session, 0);
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            var.view().subscribe(&session, move || log.borrow_mut().push(name));
        }

        var.set(5);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn observer_may_write_another_var() {
        let session = Session::new();
        let source = Var::new(&session, 1);
        let doubled = Var::new(&session, 0);

        let (src, dst) = (source.clone(), doubled.clone());
        source.view().subscribe(&session, move || dst.set(src.get() * 2));

        source.set(21);
        assert_eq!(doubled.get(), 42);
    }

    #[test]
    fn dispose_detaches_and_silences() {
        let session = Session::new();
        let var = Var::new(&session, 0);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        var.view().subscribe(&session, move || counter.set(counter.get() + 1));

        var.set(1);
        session.dispose();
        var.set(2);

        assert_eq!(hits.get(), 1);
        assert_eq!(var.get(), 2);
        assert!(!var.is_attached());
        assert_eq!(session.observer_count(), 0);
    }

    #[test]
    fn dropping_the_session_releases_captured_state() {
        let session = Session::new();
        let var = Var::new(&session, 0);
        let captured = Rc::new(());
        let held = Rc::clone(&captured);
        var.view()
            .subscribe(&session, move || drop(Rc::clone(&held)));
        assert_eq!(Rc::strong_count(&captured), 2);

        drop(session);
        assert_eq!(Rc::strong_count(&captured), 1);
        assert!(!var.is_attached());
        var.set(1);
    }
}
