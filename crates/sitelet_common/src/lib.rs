pub mod messages;
pub use messages::*;

pub mod api;
pub use api::{ReverseString, Reversed};

pub mod codec;

pub mod error;
pub use error::NetworkError;

use serde::{Deserialize, Serialize};

use std::fmt::Debug;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
/// [`NetworkPacket`]s are untyped packets exchanged with the remoting endpoint
///
/// The packet carries the full type name (for logs) and the schema hash of
/// the short type name (for matching). Handlers are looked up by hash so a
/// type can move between modules without breaking older clients.
pub struct NetworkPacket {
    /// Full type name including module path.
    /// Example: "sitelet_common::api::ReverseString"
    pub type_name: String,
    /// Schema hash computed from the short type name
    pub schema_hash: u64,
    /// The bincode-serialized message
    pub data: Vec<u8>,
}

impl NetworkPacket {
    /// Wrap a message into a packet.
    pub fn wrap<T: SiteletMessage>(message: &T) -> Result<Self, NetworkError> {
        let data = bincode::serde::encode_to_vec(message, bincode::config::standard())
            .map_err(|_| NetworkError::Serialization)?;
        Ok(Self {
            type_name: T::type_name().to_string(),
            schema_hash: T::schema_hash(),
            data,
        })
    }

    /// Returns true if this packet carries a `T`.
    pub fn is<T: SiteletMessage>(&self) -> bool {
        self.schema_hash == T::schema_hash()
    }

    /// Decode the payload as `T`.
    ///
    /// Fails with [`NetworkError::Serialization`] when the hash does not match
    /// or the payload is malformed.
    pub fn unwrap_as<T: SiteletMessage>(&self) -> Result<T, NetworkError> {
        if !self.is::<T>() {
            return Err(NetworkError::Serialization);
        }
        bincode::serde::decode_from_slice(&self.data, bincode::config::standard())
            .map(|(message, _)| message)
            .map_err(|_| NetworkError::Serialization)
    }
}

impl Debug for NetworkPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkPacket")
            .field("type_name", &self.type_name)
            .field("schema_hash", &format_args!("0x{:016x}", self.schema_hash))
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_then_unwrap_preserves_message() {
        let request = ReverseString::new("abc");
        let packet = NetworkPacket::wrap(&request).unwrap();

        assert!(packet.is::<ReverseString>());
        assert!(!packet.is::<Reversed>());
        assert_eq!(packet.unwrap_as::<ReverseString>().unwrap(), request);
    }

    #[test]
    fn unwrap_as_wrong_type_is_rejected() {
        let packet = NetworkPacket::wrap(&ReverseString::new("abc")).unwrap();
        assert!(matches!(
            packet.unwrap_as::<Reversed>(),
            Err(NetworkError::Serialization)
        ));
    }

    #[test]
    fn debug_hides_payload_bytes() {
        let packet = NetworkPacket::wrap(&ReverseString::new("secret")).unwrap();
        let rendered = format!("{:?}", packet);
        assert!(rendered.contains("data_len"));
        assert!(!rendered.contains("secret"));
    }
}
