//! Mapping a view through an asynchronous operation.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt, SpawnError};
use tracing::{debug, trace, warn};

use super::{Session, Var, View};

/// State of the most recent asynchronous invocation started by [`map_async`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AsyncResult<T, E> {
    /// The watched view holds no value; nothing was started.
    #[default]
    Idle,
    /// An invocation is in flight.
    Pending,
    Success(T),
    Failure(E),
}

impl<T, E> AsyncResult<T, E> {
    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncResult::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncResult::Pending)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            AsyncResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            AsyncResult::Failure(err) => Some(err),
            _ => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for AsyncResult<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => AsyncResult::Success(value),
            Err(err) => AsyncResult::Failure(err),
        }
    }
}

struct Bridge<T, R, E, F, S> {
    source: View<Option<T>>,
    state: Var<AsyncResult<R, E>>,
    /// Generation of the newest invocation; only it may publish.
    latest: Rc<Cell<u64>>,
    spawner: S,
    f: F,
}

impl<T, R, E, F, Fut, S> Bridge<T, R, E, F, S>
where
    T: Clone + 'static,
    R: Clone + 'static,
    E: Clone + From<SpawnError> + 'static,
    F: Fn(T) -> Fut + 'static,
    Fut: Future<Output = Result<R, E>> + 'static,
    S: LocalSpawn + 'static,
{
    fn restart(&self) {
        let generation = self.latest.get() + 1;
        self.latest.set(generation);

        let Some(value) = self.source.get() else {
            if !self.state.with(AsyncResult::is_idle) {
                self.state.set(AsyncResult::Idle);
            }
            return;
        };

        self.state.set(AsyncResult::Pending);
        debug!("async bridge started invocation {}", generation);

        let call = (self.f)(value);
        let state = self.state.clone();
        let latest = Rc::clone(&self.latest);
        let task = async move {
            let result = call.await;
            if latest.get() != generation {
                trace!(
                    "discarding result of invocation {} (superseded by {})",
                    generation,
                    latest.get()
                );
                return;
            }
            if !state.is_attached() {
                trace!("discarding result of invocation {}: session ended", generation);
                return;
            }
            state.set(result.into());
        };

        if let Err(err) = self.spawner.spawn_local(task) {
            warn!("async bridge could not spawn invocation {}: {}", generation, err);
            self.state.set(AsyncResult::Failure(E::from(err)));
        }
    }
}

/// Map the committed values of `source` through the asynchronous `f`.
///
/// Every write to `source` that leaves it holding `Some(v)` starts `f(v)` on
/// `spawner` and moves the returned view to [`AsyncResult::Pending`]. Only
/// the most recently started invocation may publish its outcome; results of
/// superseded invocations are dropped when they settle, without aborting the
/// invocation itself. While `source` holds `None` the view is
/// [`AsyncResult::Idle`].
///
/// The watcher is registered in `session` and is released with it.
pub fn map_async<T, R, E, F, Fut, S>(
    session: &Session,
    source: View<Option<T>>,
    spawner: S,
    f: F,
) -> View<AsyncResult<R, E>>
where
    T: Clone + 'static,
    R: Clone + 'static,
    E: Clone + From<SpawnError> + 'static,
    F: Fn(T) -> Fut + 'static,
    Fut: Future<Output = Result<R, E>> + 'static,
    S: LocalSpawn + 'static,
{
    let state = Var::new(session, AsyncResult::Idle);
    let bridge = Rc::new(Bridge {
        source: source.clone(),
        state: state.clone(),
        latest: Rc::new(Cell::new(0)),
        spawner,
        f,
    });

    bridge.restart();
    source.subscribe(session, move || bridge.restart());
    state.view()
}
