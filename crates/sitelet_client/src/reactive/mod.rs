//! Reactive primitives for one client session.
//!
//! - [`Var`]: a versioned, mutable value.
//! - [`View`]: a lazily recomputed, memoized projection over vars.
//! - [`Submitter`]: an explicit commit boundary in front of a view.
//! - [`map_async`]: maps a view through an async operation into an
//!   [`AsyncResult`] view, last invocation wins.
//! - [`Session`]: owns every observer registration and tears them down
//!   together.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); a session is never
//! shared between threads.

mod async_view;
mod session;
mod submitter;
mod var;
mod view;

pub use async_view::{AsyncResult, map_async};
pub use session::{ObserverId, Session};
pub use submitter::Submitter;
pub use var::Var;
pub use view::View;
