//! Server side of the remoting endpoint.
//!
//! Handlers are registered per request type and looked up by the packet's
//! schema hash. [`RemoteRegistry::handle_bytes`] is the whole wire protocol:
//! codec-framed packet in, codec-framed reply out.

use std::sync::Arc;

use async_trait::async_trait;
use codee::{Decoder, Encoder};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt};
use sitelet_client::RemoteTransport;
use sitelet_common::codec::SiteletBincodeCodec;
use sitelet_common::{
    NetworkError, NetworkPacket, RemoteFault, RequestMessage, ReverseString, Reversed,
    SiteletMessage,
};
use thiserror::Error;
use tracing::{debug, error, warn};

type BoxedHandler = Arc<
    dyn Fn(NetworkPacket) -> BoxFuture<'static, Result<NetworkPacket, DispatchError>> + Send + Sync,
>;

struct Registration {
    type_name: &'static str,
    handler: BoxedHandler,
}

/// Why a remoting request was not answered with a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The body was not a packet, or the packet did not hold the request type
    /// it claimed.
    #[error("malformed request: {0}")]
    Malformed(NetworkError),

    /// No handler is registered for the request type.
    #[error(transparent)]
    Unknown(NetworkError),

    /// The handler ran and failed.
    #[error("handler failed: {}", .0.message)]
    Handler(RemoteFault),
}

impl DispatchError {
    /// The fault sent back to the caller.
    pub fn fault(&self) -> RemoteFault {
        match self {
            DispatchError::Handler(fault) => fault.clone(),
            other => RemoteFault::new(other.to_string()),
        }
    }
}

/// A reply ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReply {
    /// Codec-framed reply packet: the response or a [`RemoteFault`].
    pub body: Vec<u8>,
    /// Set when `body` carries a fault.
    pub error: Option<DispatchError>,
}

/// Remote handlers, keyed by request schema hash.
#[derive(Default)]
pub struct RemoteRegistry {
    handlers: DashMap<u64, Registration>,
}

impl std::fmt::Debug for RemoteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RemoteRegistry [{} handlers]", self.handlers.len())
    }
}

impl RemoteRegistry {
    /// A registry without handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry serving the site's remote API.
    pub fn site_api() -> Result<Self, NetworkError> {
        let registry = Self::new();
        registry.register::<ReverseString, _, _>(reverse_string)?;
        Ok(registry)
    }

    /// Serve requests of type `R` with `handler`.
    ///
    /// Fails if `R`, or another type with the same short name, is already
    /// registered.
    pub fn register<R, F, Fut>(&self, handler: F) -> Result<(), NetworkError>
    where
        R: RequestMessage,
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R::ResponseMessage, RemoteFault>> + Send + 'static,
    {
        let type_name = R::type_name();
        let schema_hash = R::schema_hash();

        let slot = match self.handlers.entry(schema_hash) {
            Entry::Occupied(existing) => {
                return Err(NetworkError::DuplicateRegistration(format!(
                    "'{}' collides with '{}' (hash: 0x{:016x})",
                    type_name,
                    existing.get().type_name,
                    schema_hash
                )));
            }
            Entry::Vacant(slot) => slot,
        };

        let handler = Arc::new(handler);
        let boxed: BoxedHandler = Arc::new(move |packet: NetworkPacket| {
            let handler = Arc::clone(&handler);
            async move {
                let request: R = packet.unwrap_as().map_err(DispatchError::Malformed)?;
                let response = handler(request).await.map_err(DispatchError::Handler)?;
                NetworkPacket::wrap(&response).map_err(|err| {
                    DispatchError::Handler(RemoteFault::new(format!(
                        "could not encode response: {}",
                        err
                    )))
                })
            }
            .boxed()
        });

        slot.insert(Registration {
            type_name,
            handler: boxed,
        });
        debug!(
            "Registered remote handler: {} (short: {}, hash: 0x{:016x})",
            type_name,
            R::short_name(),
            schema_hash
        );
        Ok(())
    }

    /// Whether a handler exists for `R`.
    pub fn is_registered<R: SiteletMessage>(&self) -> bool {
        self.handlers.contains_key(&R::schema_hash())
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `packet`.
    pub async fn dispatch(&self, packet: NetworkPacket) -> Result<NetworkPacket, DispatchError> {
        // Clone the handler out so no map guard is held across the await.
        let handler = self
            .handlers
            .get(&packet.schema_hash)
            .map(|registration| Arc::clone(&registration.handler));

        let Some(handler) = handler else {
            warn!("No remote handler for {}", packet.type_name);
            return Err(DispatchError::Unknown(NetworkError::UnknownRequest(
                packet.type_name,
            )));
        };

        debug!("Dispatching remote call {}", packet.type_name);
        handler(packet).await
    }

    /// Decode a framed request, dispatch it and encode the reply.
    pub async fn handle_bytes(&self, body: &[u8]) -> Result<EncodedReply, NetworkError> {
        let outcome = match SiteletBincodeCodec::decode(body) {
            Ok(packet) => self.dispatch(packet).await,
            Err(err) => Err(DispatchError::Malformed(err)),
        };

        let (packet, error) = match outcome {
            Ok(packet) => (packet, None),
            Err(err) => {
                if matches!(err, DispatchError::Handler(_)) {
                    error!("Remote call failed: {}", err);
                } else {
                    warn!("Rejected remote call: {}", err);
                }
                (NetworkPacket::wrap(&err.fault())?, Some(err))
            }
        };

        Ok(EncodedReply {
            body: SiteletBincodeCodec::encode(&packet)?,
            error,
        })
    }
}

/// Reverses `input` by Unicode scalar value.
pub async fn reverse_string(request: ReverseString) -> Result<Reversed, RemoteFault> {
    Ok(Reversed {
        output: request.input.chars().rev().collect(),
    })
}

/// In-process [`RemoteTransport`] that goes through the same framing as HTTP
/// callers.
#[derive(Clone, Debug)]
pub struct LoopbackTransport {
    registry: Arc<RemoteRegistry>,
}

impl LoopbackTransport {
    /// Deliver packets to `registry`.
    pub fn new(registry: Arc<RemoteRegistry>) -> Self {
        debug!("Loopback transport attached to {:?}", registry);
        Self { registry }
    }
}

#[async_trait]
impl RemoteTransport for LoopbackTransport {
    async fn exchange(&self, packet: NetworkPacket) -> Result<NetworkPacket, NetworkError> {
        let request = SiteletBincodeCodec::encode(&packet)?;
        let reply = self.registry.handle_bytes(&request).await?;
        SiteletBincodeCodec::decode(&reply.body)
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Explode;

    impl RequestMessage for Explode {
        type ResponseMessage = Reversed;
    }

    mod other {
        #[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
        pub struct ReverseString;

        impl sitelet_common::RequestMessage for ReverseString {
            type ResponseMessage = ();
        }
    }

    fn framed<T: SiteletMessage>(message: &T) -> Vec<u8> {
        SiteletBincodeCodec::encode(&NetworkPacket::wrap(message).unwrap()).unwrap()
    }

    fn reply_of(reply: &EncodedReply) -> NetworkPacket {
        SiteletBincodeCodec::decode(&reply.body).unwrap()
    }

    #[test]
    fn reverses_by_char() {
        let reversed = block_on(reverse_string(ReverseString::new("héllo"))).unwrap();
        assert_eq!(reversed.output, "olléh");
        let empty = block_on(reverse_string(ReverseString::new(""))).unwrap();
        assert_eq!(empty.output, "");
    }

    #[test]
    fn duplicate_short_names_are_rejected() {
        let registry = RemoteRegistry::site_api().unwrap();
        assert!(registry.is_registered::<ReverseString>());

        let again = registry.register::<ReverseString, _, _>(reverse_string);
        assert!(matches!(again, Err(NetworkError::DuplicateRegistration(_))));

        let collision = registry.register::<other::ReverseString, _, _>(|_| async { Ok(()) });
        assert!(matches!(collision, Err(NetworkError::DuplicateRegistration(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn handles_a_framed_request() {
        let registry = RemoteRegistry::site_api().unwrap();
        let reply = block_on(registry.handle_bytes(&framed(&ReverseString::new("abc")))).unwrap();

        assert_eq!(reply.error, None);
        let reversed: Reversed = reply_of(&reply).unwrap_as().unwrap();
        assert_eq!(reversed.output, "cba");
    }

    #[test]
    fn unknown_request_gets_a_fault() {
        let registry = RemoteRegistry::new();
        let reply = block_on(registry.handle_bytes(&framed(&ReverseString::new("abc")))).unwrap();

        assert!(matches!(reply.error, Some(DispatchError::Unknown(_))));
        let fault: RemoteFault = reply_of(&reply).unwrap_as().unwrap();
        assert!(fault.message.contains("ReverseString"), "{}", fault.message);
    }

    #[test]
    fn garbage_gets_a_malformed_fault() {
        let registry = RemoteRegistry::site_api().unwrap();
        let reply = block_on(registry.handle_bytes(b"definitely not a packet")).unwrap();

        assert!(matches!(reply.error, Some(DispatchError::Malformed(_))));
        assert!(reply_of(&reply).is::<RemoteFault>());
    }

    #[test]
    fn handler_failure_is_forwarded() {
        let registry = RemoteRegistry::new();
        registry
            .register::<Explode, _, _>(|_| async { Err(RemoteFault::new("kaboom")) })
            .unwrap();

        let reply = block_on(registry.handle_bytes(&framed(&Explode))).unwrap();
        assert_eq!(
            reply.error,
            Some(DispatchError::Handler(RemoteFault::new("kaboom")))
        );
        let fault: RemoteFault = reply_of(&reply).unwrap_as().unwrap();
        assert_eq!(fault.message, "kaboom");
    }

    #[test]
    fn loopback_round_trip() {
        let transport = LoopbackTransport::new(Arc::new(RemoteRegistry::site_api().unwrap()));
        let reply =
            block_on(transport.exchange(NetworkPacket::wrap(&ReverseString::new("hello")).unwrap()))
                .unwrap();
        assert_eq!(reply.unwrap_as::<Reversed>().unwrap().output, "olleh");
    }
}
