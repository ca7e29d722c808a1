use async_trait::async_trait;
use sitelet_common::{
    NetworkError, NetworkPacket, RemoteFault, RequestMessage, ReverseString, SiteletMessage,
};
use tracing::debug;

use crate::RemoteError;

/// Delivers one request packet to the server and returns its reply packet.
///
/// Implemented by whatever carries packets: an HTTP client, a websocket,
/// or an in-process loopback to a server-side registry.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn exchange(&self, packet: NetworkPacket) -> Result<NetworkPacket, NetworkError>;
}

#[async_trait]
impl<T: RemoteTransport + ?Sized> RemoteTransport for std::sync::Arc<T> {
    async fn exchange(&self, packet: NetworkPacket) -> Result<NetworkPacket, NetworkError> {
        (**self).exchange(packet).await
    }
}

/// Typed request/response client on top of a [`RemoteTransport`].
#[derive(Debug, Clone)]
pub struct Remote<T> {
    transport: T,
}

impl<T: RemoteTransport> Remote<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and wait for its typed response.
    ///
    /// A [`RemoteFault`] reply becomes [`RemoteError::Fault`].
    pub async fn call<R: RequestMessage>(
        &self,
        request: R,
    ) -> Result<R::ResponseMessage, RemoteError> {
        let packet = NetworkPacket::wrap(&request)?;
        debug!("[Remote::call] sending {}", R::request_name());

        let reply = self.transport.exchange(packet).await?;

        if reply.is::<RemoteFault>() {
            let fault: RemoteFault = reply.unwrap_as()?;
            debug!("[Remote::call] {} failed: {}", R::request_name(), fault.message);
            return Err(RemoteError::Fault(fault.message));
        }
        if !reply.is::<R::ResponseMessage>() {
            return Err(RemoteError::UnexpectedResponse {
                expected: <R::ResponseMessage as SiteletMessage>::type_name().to_string(),
                actual: reply.type_name,
            });
        }
        reply
            .unwrap_as::<R::ResponseMessage>()
            .map_err(RemoteError::from)
    }

    /// Ask the server to reverse `input`.
    pub async fn reverse_string(&self, input: String) -> Result<String, RemoteError> {
        self.call(ReverseString { input })
            .await
            .map(|reversed| reversed.output)
    }
}
