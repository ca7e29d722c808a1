//! Read-only, lazily recomputed projections over vars.
//!
//! A [`View`] never pushes values. Reading one compares the version of its
//! upstream sources with the version its cache was computed under and only
//! reruns the mapping function on a mismatch. Push notifications are opt-in
//! through [`View::subscribe`], which registers a callback on every var the
//! view ultimately reads.

use std::cell::RefCell;
use std::rc::Rc;

use super::session::{ObserverId, Session, SourceId};

pub(crate) trait ViewNode<T> {
    fn get(&self) -> T;
    /// Monotonic in the versions of every upstream var.
    fn version(&self) -> u64;
    fn sources(&self, out: &mut Vec<SourceId>);
}

/// A read-only value derived from one or more [`Var`](super::Var)s.
///
/// Cloning a `View` shares the underlying node and its cache.
pub struct View<T> {
    node: Rc<dyn ViewNode<T>>,
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for View<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("version", &self.node.version())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> View<T> {
    pub(crate) fn from_node(node: Rc<dyn ViewNode<T>>) -> Self {
        Self { node }
    }

    /// Current value, recomputed first if any upstream var changed.
    pub fn get(&self) -> T {
        self.node.get()
    }

    pub fn version(&self) -> u64 {
        self.node.version()
    }

    /// Derive a new view. `f` must be pure; it runs at most once per
    /// upstream version, on the first read after a change.
    pub fn map<B: Clone + 'static>(&self, f: impl Fn(&T) -> B + 'static) -> View<B> {
        View::from_node(Rc::new(MapNode {
            source: self.clone(),
            f: Box::new(f),
            cache: RefCell::new(None),
        }))
    }

    /// Derive a view from two sources.
    pub fn map2<U: 'static, B: Clone + 'static>(
        &self,
        other: &View<U>,
        f: impl Fn(&T, &U) -> B + 'static,
    ) -> View<B> {
        View::from_node(Rc::new(Map2Node {
            a: self.clone(),
            b: other.clone(),
            f: Box::new(f),
            cache: RefCell::new(None),
        }))
    }

    /// Run `callback` after every write to any var this view depends on.
    ///
    /// The registration lives in `session` until [`Session::unsubscribe`] or
    /// [`Session::dispose`]. Views without upstream vars never fire.
    pub fn subscribe(&self, session: &Session, callback: impl Fn() + 'static) -> ObserverId {
        let mut sources = Vec::new();
        self.node.sources(&mut sources);
        sources.sort_unstable();
        sources.dedup();
        session.observe(&sources, Rc::new(callback))
    }
}

impl<T: Clone + 'static> View<T> {
    /// A view that never changes.
    pub fn constant(value: T) -> Self {
        View::from_node(Rc::new(ConstNode(value)))
    }
}

struct ConstNode<T>(T);

impl<T: Clone> ViewNode<T> for ConstNode<T> {
    fn get(&self) -> T {
        self.0.clone()
    }

    fn version(&self) -> u64 {
        0
    }

    fn sources(&self, _out: &mut Vec<SourceId>) {}
}

struct MapNode<A, B> {
    source: View<A>,
    f: Box<dyn Fn(&A) -> B>,
    /// Last result and the upstream version it was computed under.
    cache: RefCell<Option<(B, u64)>>,
}

impl<A: 'static, B: Clone> ViewNode<B> for MapNode<A, B> {
    fn get(&self) -> B {
        let version = self.source.version();
        if let Some((value, cached_at)) = &*self.cache.borrow() {
            if *cached_at == version {
                return value.clone();
            }
        }
        // A panic in `f` leaves the old cache in place; the next read retries.
        let value = (self.f)(&self.source.get());
        *self.cache.borrow_mut() = Some((value.clone(), version));
        value
    }

    fn version(&self) -> u64 {
        self.source.version()
    }

    fn sources(&self, out: &mut Vec<SourceId>) {
        self.source.node.sources(out);
    }
}

struct Map2Node<A, U, B> {
    a: View<A>,
    b: View<U>,
    f: Box<dyn Fn(&A, &U) -> B>,
    cache: RefCell<Option<(B, (u64, u64))>>,
}

impl<A: 'static, U: 'static, B: Clone> ViewNode<B> for Map2Node<A, U, B> {
    fn get(&self) -> B {
        let versions = (self.a.version(), self.b.version());
        if let Some((value, cached_at)) = &*self.cache.borrow() {
            if *cached_at == versions {
                return value.clone();
            }
        }
        let value = (self.f)(&self.a.get(), &self.b.get());
        *self.cache.borrow_mut() = Some((value.clone(), versions));
        value
    }

    fn version(&self) -> u64 {
        // Both inputs only grow, so the sum strictly grows with either.
        self.a.version() + self.b.version()
    }

    fn sources(&self, out: &mut Vec<SourceId>) {
        self.a.node.sources(out);
        self.b.node.sources(out);
    }
}
