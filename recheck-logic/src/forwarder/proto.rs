//! Subset of the guardian's privileged admin service used for re-observation.

use tonic::codegen::{Body, Bytes, StdError, http};

#[derive(Clone, PartialEq, prost::Message)]
pub struct ObservationRequest {
    #[prost(uint32, tag = "1")]
    pub chain_id: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub tx_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SendObservationRequestRequest {
    #[prost(message, optional, tag = "1")]
    pub observation_request: Option<ObservationRequest>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct SendObservationRequestResponse {}

const SERVICE: &str = "node.v1.NodePrivilegedService";
const SEND_OBSERVATION_REQUEST: &str = "/node.v1.NodePrivilegedService/SendObservationRequest";

#[derive(Debug, Clone)]
pub struct NodePrivilegedServiceClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> NodePrivilegedServiceClient<T>
where
    T: tonic::client::GrpcService<tonic::body::Body>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        Self {
            inner: tonic::client::Grpc::new(inner),
        }
    }

    pub async fn send_observation_request(
        &mut self,
        request: impl tonic::IntoRequest<SendObservationRequestRequest>,
    ) -> Result<tonic::Response<SendObservationRequestResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|err| {
            tonic::Status::unavailable(format!("service was not ready: {}", err.into()))
        })?;
        let mut request = request.into_request();
        request
            .extensions_mut()
            .insert(tonic::GrpcMethod::new(SERVICE, "SendObservationRequest"));
        self.inner
            .unary(
                request,
                http::uri::PathAndQuery::from_static(SEND_OBSERVATION_REQUEST),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }
}
