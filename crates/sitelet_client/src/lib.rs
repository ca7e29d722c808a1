//! # Sitelet Client
//!
//! Client-side half of the sitelet demo: a small reactive core, a typed
//! remoting client and the widget built from them.
//!
//! ## Features
//!
//! - **Versioned vars and lazy views**: views recompute only on the first
//!   read after an upstream write
//! - **Submit-on-click**: a [`Submitter`](reactive::Submitter) commits its
//!   input only when triggered, and never commits "no value"
//! - **Last request wins**: [`map_async`](reactive::map_async) publishes only
//!   the newest invocation's outcome
//! - **Deterministic teardown**: every observer lives in a
//!   [`Session`](reactive::Session) and is released with it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use futures::executor::LocalPool;
//! use sitelet_client::{Remote, Reverser, reactive::Session};
//!
//! let session = Session::new();
//! let mut pool = LocalPool::new();
//! let widget = Reverser::new(&session, Rc::new(Remote::new(transport)), pool.spawner());
//!
//! widget.input().set("hello".to_string());
//! widget.send();
//! pool.run_until_stalled();
//! assert_eq!(widget.response_text(), "olleh");
//! ```

mod error;
pub mod reactive;
mod remote;
pub mod widget;

pub use error::RemoteError;
pub use remote::{Remote, RemoteTransport};
pub use widget::Reverser;

// Re-export the wire types clients need to talk to the server
pub use sitelet_common::{NetworkError, NetworkPacket, ReverseString, Reversed};
