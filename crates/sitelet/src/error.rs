use std::net::SocketAddr;

use sitelet_common::NetworkError;
use thiserror::Error;

use crate::Endpoint;

/// Errors raised while assembling or running the site.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Two routes would answer the same request.
    #[error("route '{pattern}' for {endpoint:?} is already taken by {existing:?}")]
    DuplicateRoute {
        /// The rejected pattern, as written.
        pattern: String,
        /// Endpoint the rejected route was meant for.
        endpoint: Endpoint,
        /// Endpoint of the earlier route that wins.
        existing: Endpoint,
    },

    /// A route pattern could not be understood.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern, as written.
        pattern: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A setting read from the environment could not be parsed.
    #[error("invalid value '{value}' for {name}")]
    InvalidSetting {
        /// Name of the environment variable.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried to bind.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Remote handler registration failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
