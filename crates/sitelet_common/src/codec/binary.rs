use codee::{Decoder, Encoder};

use crate::{NetworkPacket, error::NetworkError};

/// Size of the little-endian length prefix in front of every frame.
pub const LENGTH_PREFIX: usize = 8;

fn frame(body: Vec<u8>) -> Vec<u8> {
    let len = body.len() as u64;
    let mut buffer = Vec::with_capacity(LENGTH_PREFIX + body.len());
    buffer.extend_from_slice(&len.to_le_bytes());
    buffer.extend_from_slice(&body);
    buffer
}

fn unframe(val: &[u8]) -> Result<&[u8], NetworkError> {
    if val.len() < LENGTH_PREFIX {
        return Err(NetworkError::Framing {
            expected: LENGTH_PREFIX as u64,
            actual: val.len(),
        });
    }

    let (prefix, body) = val.split_at(LENGTH_PREFIX);
    let length_bytes: [u8; LENGTH_PREFIX] =
        prefix.try_into().map_err(|_| NetworkError::Serialization)?;
    let expected = u64::from_le_bytes(length_bytes);
    if expected != body.len() as u64 {
        return Err(NetworkError::Framing {
            expected,
            actual: body.len(),
        });
    }
    Ok(body)
}

/// Codec for the remoting endpoint (multi-message mode).
///
/// Frame layout:
/// - 8-byte little-endian length prefix
/// - bincode-serialized [`NetworkPacket`]
///
/// The caller wraps messages in a [`NetworkPacket`] and routes on
/// [`NetworkPacket::schema_hash`] after decoding.
pub struct SiteletBincodeCodec;

impl Encoder<NetworkPacket> for SiteletBincodeCodec {
    type Error = NetworkError;
    type Encoded = Vec<u8>;

    fn encode(val: &NetworkPacket) -> Result<Self::Encoded, Self::Error> {
        let encoded_packet = bincode::serde::encode_to_vec(val, bincode::config::standard())
            .map_err(|_| NetworkError::Serialization)?;
        Ok(frame(encoded_packet))
    }
}

impl Decoder<NetworkPacket> for SiteletBincodeCodec {
    type Error = NetworkError;
    type Encoded = [u8];

    fn decode(val: &Self::Encoded) -> Result<NetworkPacket, Self::Error> {
        let body = unframe(val)?;
        bincode::serde::decode_from_slice(body, bincode::config::standard())
            .map(|(packet, _)| packet)
            .map_err(|e| {
                tracing::debug!("[SiteletBincodeCodec::decode] bad packet: {:?}", e);
                NetworkError::Serialization
            })
    }
}
