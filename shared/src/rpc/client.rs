//! RPC client over the fabric.
//!
//! One client holds one lazily-dialled channel, re-dialled after transport
//! failures. Every call carries a deadline and transient failures retry
//! with backoff.

use bytes::Bytes;
use prost::Message;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Duration};
use tonic::client::Grpc;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::{health_check_response::ServingStatus, HealthCheckRequest};
use tracing::{debug, warn};

use super::codec::RawCodec;
use super::status::{Code, Status};
use crate::proto::common::{ListMethodsRequest, ListMethodsResponse};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

pub struct RpcClient {
    addr: String,
    connect_timeout: Duration,
    call_timeout: Duration,
    channel: Mutex<Option<Channel>>,
}

impl RpcClient {
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            channel: Mutex::new(None),
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn channel(&self) -> Result<Channel, Status> {
        let mut guard = self.channel.lock().await;
        if let Some(channel) = guard.as_ref() {
            return Ok(channel.clone());
        }

        let endpoint = Endpoint::from_shared(format!("http://{}", self.addr))
            .map_err(|e| Status::invalid_argument(format!("invalid address {}: {e}", self.addr)))?
            .connect_timeout(self.connect_timeout)
            .timeout(self.call_timeout);
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| Status::unavailable(format!("connect to {} failed: {e}", self.addr)))?;

        debug!(addr = %self.addr, "rpc channel established");
        *guard = Some(channel.clone());
        Ok(channel)
    }

    /// Invoke a method with the client's default deadline.
    pub async fn call<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, Status>
    where
        Req: Message,
        Resp: Message + Default,
    {
        self.call_with_deadline(method, request, self.call_timeout)
            .await
    }

    /// Invoke a method with an explicit deadline. Transient transport
    /// failures retry up to three times with exponential backoff;
    /// domain-level statuses surface immediately.
    pub async fn call_with_deadline<Req, Resp>(
        &self,
        method: &str,
        request: &Req,
        deadline: Duration,
    ) -> Result<Resp, Status>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let mut payload = Vec::with_capacity(request.encoded_len());
        request
            .encode(&mut payload)
            .map_err(|e| Status::internal(format!("request encoding failed: {e}")))?;
        let payload = Bytes::from(payload);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.unary(method, payload.clone(), deadline).await {
                Ok(bytes) => {
                    return Resp::decode(bytes).map_err(|e| {
                        Status::internal(format!("response decoding failed: {e}"))
                    })
                }
                Err(status) if is_transient(status.code()) && attempt < MAX_RETRIES => {
                    warn!(
                        addr = %self.addr,
                        method, attempt, "call failed, retrying: {status}"
                    );
                    // The channel may be wedged; drop it so the retry dials
                    // fresh.
                    self.close().await;
                    sleep(RETRY_BASE_DELAY * 2_u32.pow(attempt - 1)).await;
                }
                Err(status) => return Err(status),
            }
        }
    }

    async fn unary(&self, method: &str, payload: Bytes, deadline: Duration) -> Result<Bytes, Status> {
        let channel = self.channel().await?;
        let method = method.to_string();

        let exchange = async move {
            let mut grpc = Grpc::new(channel);
            grpc.ready()
                .await
                .map_err(|e| Status::unavailable(format!("service not ready: {e}")))?;

            let path = PathAndQuery::from_maybe_shared(format!("/{method}"))
                .map_err(|_| Status::invalid_argument(format!("invalid method name {method}")))?;
            let response = grpc
                .unary(tonic::Request::new(payload), path, RawCodec)
                .await?;
            Ok(response.into_inner())
        };

        match timeout(deadline, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Status::deadline_exceeded(format!(
                "call deadline of {deadline:?} exceeded"
            ))),
        }
    }

    /// Standard gRPC health probe against the server's health service.
    pub async fn health_check(&self) -> Result<bool, Status> {
        let channel = self.channel().await?;
        let mut client = HealthClient::new(channel);
        let response = client
            .check(HealthCheckRequest {
                service: String::new(),
            })
            .await?;
        Ok(response.into_inner().status == ServingStatus::Serving as i32)
    }

    /// Reflection listing for one service.
    pub async fn list_methods(&self, service: &str) -> Result<ListMethodsResponse, Status> {
        self.call(&format!("{service}/ListMethods"), &ListMethodsRequest {})
            .await
    }

    /// Drop the channel. Subsequent calls re-dial.
    pub async fn close(&self) {
        let mut guard = self.channel.lock().await;
        *guard = None;
    }
}

/// Retry only what a redial can plausibly fix.
fn is_transient(code: Code) -> bool {
    matches!(
        code,
        Code::Unavailable | Code::ResourceExhausted | Code::DeadlineExceeded
    )
}
