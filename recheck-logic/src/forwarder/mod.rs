pub mod proto;

use crate::{error::ForwardError, settings::AdminRpcSettings, types::Chain};
use anyhow::Context;
use async_trait::async_trait;
use hyper_util::rt::TokioIo;
use proto::{NodePrivilegedServiceClient, ObservationRequest, SendObservationRequestRequest};
use tokio::net::UnixStream;
use tonic::transport::{Channel, Endpoint, Uri};
use tower::service_fn;

/// Sends re-observation requests to the guardian's privileged peer.
#[async_trait]
pub trait ObservationForwarder: Send + Sync {
    async fn forward(&self, chain: Chain, observation_reference: &[u8]) -> Result<(), ForwardError>;
}

/// Forwarder talking to the admin gRPC service over a local Unix socket.
#[derive(Clone)]
pub struct AdminRpcForwarder {
    client: NodePrivilegedServiceClient<Channel>,
}

impl AdminRpcForwarder {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: NodePrivilegedServiceClient::new(channel),
        }
    }

    pub async fn connect(settings: &AdminRpcSettings) -> anyhow::Result<Self> {
        let socket_path = settings.socket_path.clone();
        // The authority is ignored; every connection goes to the socket.
        let endpoint = Endpoint::from_static("http://[::]:50051").connect_timeout(settings.connect_timeout);
        let connect = endpoint.connect_with_connector(service_fn(move |_: Uri| {
            let socket_path = socket_path.clone();
            async move { Ok::<_, std::io::Error>(TokioIo::new(UnixStream::connect(socket_path).await?)) }
        }));

        let channel = tokio::time::timeout(settings.connect_timeout, connect)
            .await
            .with_context(|| {
                format!(
                    "timed out connecting to admin socket {}",
                    settings.socket_path.display()
                )
            })?
            .with_context(|| {
                format!(
                    "failed to connect to admin socket {}",
                    settings.socket_path.display()
                )
            })?;

        tracing::info!(socket = %settings.socket_path.display(), "connected to admin rpc");
        Ok(Self::new(channel))
    }
}

#[async_trait]
impl ObservationForwarder for AdminRpcForwarder {
    async fn forward(&self, chain: Chain, observation_reference: &[u8]) -> Result<(), ForwardError> {
        let request = SendObservationRequestRequest {
            observation_request: Some(ObservationRequest {
                chain_id: chain.id().into(),
                tx_hash: observation_reference.to_vec(),
            }),
        };
        self.client.clone().send_observation_request(request).await?;
        Ok(())
    }
}
