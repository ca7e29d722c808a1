use futures::task::SpawnError;
use sitelet_common::NetworkError;
use thiserror::Error;

/// Errors that can occur when calling the server through a [`Remote`](crate::Remote).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The packet could not be encoded, sent or decoded.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The server received the request but could not serve it.
    #[error("server fault: {0}")]
    Fault(String),

    /// The server answered with a message of the wrong type.
    ///
    /// This usually means client and server were built from different
    /// versions of the API.
    #[error("expected response '{expected}', got '{actual}'")]
    UnexpectedResponse { expected: String, actual: String },

    /// The local executor refused the task driving the call.
    #[error("could not spawn remote call: {0}")]
    Spawn(String),
}

impl From<SpawnError> for RemoteError {
    fn from(err: SpawnError) -> Self {
        RemoteError::Spawn(err.to_string())
    }
}
