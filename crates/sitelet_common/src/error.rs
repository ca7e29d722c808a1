use thiserror::Error;

/// Errors raised while encoding, decoding or routing remoting packets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A message or packet could not be (de)serialized.
    #[error("failed to serialize or deserialize a network packet")]
    Serialization,

    /// The length prefix does not match the payload that followed it.
    #[error("frame length mismatch: prefix says {expected} bytes, got {actual}")]
    Framing { expected: u64, actual: usize },

    /// No handler is registered for the packet's request type.
    #[error("no remote handler registered for '{0}'")]
    UnknownRequest(String),

    /// A handler for this request type (or one with the same short name)
    /// already exists.
    #[error("duplicate registration of remote handler: {0}")]
    DuplicateRegistration(String),

    /// The transport failed to deliver the packet.
    #[error("transport error: {0}")]
    Transport(String),
}
