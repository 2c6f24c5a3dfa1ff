// ============================================================================
// MERIDIAN - RPC SERVER
// ============================================================================
// Module: shared/src/rpc/server.rs
// Description: Typed method registry served through tonic, with the
//              standard gRPC health service, a reflection method and a
//              bounded graceful drain
// ============================================================================

use bytes::Bytes;
use prost::Message;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;
use tonic::codegen::*;
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::transport::Server;
use tonic_health::ServingStatus;
use tracing::{info, warn};

use super::codec::RawCodec;
use super::status::Status;
use crate::error::{Error, Result};
use crate::proto::common::{ListMethodsRequest, ListMethodsResponse};

/// How long in-flight requests get to drain after a stop signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

type HandlerFuture = BoxFuture<Bytes, Status>;
type MethodHandler = Arc<dyn Fn(Bytes) -> HandlerFuture + Send + Sync>;

/// Compile-time identity of one fabric service. The name doubles as the
/// gRPC route prefix, so it must match the method constants in the
/// service's schema module.
pub trait FabricService: Send + Sync + 'static {
    const NAME: &'static str;
}

/// An RPC server for one service: a named registry of typed unary methods.
///
/// Lifecycle: register methods, then `serve`. Serving binds the port and
/// accepts through tonic; on cancellation the health service flips to
/// not-serving, the listener stops accepting, and in-flight requests drain
/// up to [`SHUTDOWN_GRACE`] before the server is forced down.
pub struct RpcServer<S: FabricService> {
    methods: HashMap<String, MethodHandler>,
    _service: PhantomData<S>,
}

impl<S: FabricService> RpcServer<S> {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
            _service: PhantomData,
        }
    }

    /// Register a typed method. The wrapper decodes the request message,
    /// runs the handler and encodes the response; malformed payloads fail
    /// with `InvalidArgument` before the handler runs.
    pub fn register<Req, Resp, F, Fut>(&mut self, method: &str, handler: F)
    where
        Req: Message + Default + 'static,
        Resp: Message + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Resp, Status>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let wrapped: MethodHandler = Arc::new(move |payload: Bytes| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request = Req::decode(payload)
                    .map_err(|e| Status::invalid_argument(format!("malformed request: {e}")))?;
                let response = handler(request).await?;
                let mut buf = Vec::with_capacity(response.encoded_len());
                response
                    .encode(&mut buf)
                    .map_err(|e| Status::internal(format!("response encoding failed: {e}")))?;
                Ok(Bytes::from(buf))
            })
        });

        // Keyed by the wire path so dispatch is a straight lookup.
        if self.methods.insert(format!("/{method}"), wrapped).is_some() {
            warn!(method, "method registered twice, keeping the latest");
        }
    }

    /// Bind and serve until the token is cancelled.
    pub async fn serve(mut self, addr: SocketAddr, shutdown: CancellationToken) -> Result<()> {
        self.register_builtins();
        let router = FabricRouter::<S> {
            methods: Arc::new(self.methods),
            _service: PhantomData,
        };

        let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_service_status(S::NAME, ServingStatus::Serving)
            .await;
        health_reporter
            .set_service_status("", ServingStatus::Serving)
            .await;

        // The drain signal flips health to not-serving first, so balancers
        // stop routing before the listener goes away.
        let drain_signal = {
            let shutdown = shutdown.clone();
            let mut reporter = health_reporter.clone();
            async move {
                shutdown.cancelled().await;
                reporter
                    .set_service_status(S::NAME, ServingStatus::NotServing)
                    .await;
                reporter
                    .set_service_status("", ServingStatus::NotServing)
                    .await;
            }
        };

        info!(service = S::NAME, %addr, "rpc server listening");
        let server = Server::builder()
            .add_service(health_service)
            .add_service(router)
            .serve_with_shutdown(addr, drain_signal);

        let mut handle = tokio::spawn(server);
        tokio::select! {
            joined = &mut handle => return flatten(joined),
            _ = shutdown.cancelled() => {}
        }

        info!(service = S::NAME, "rpc server draining");
        match timeout(SHUTDOWN_GRACE, &mut handle).await {
            Ok(joined) => flatten(joined)?,
            Err(_) => {
                warn!(service = S::NAME, "drain timed out, forcing stop");
                handle.abort();
            }
        }
        info!(service = S::NAME, "rpc server stopped");
        Ok(())
    }

    fn register_builtins(&mut self) {
        let reflection_method = format!("{}/ListMethods", S::NAME);
        let service = S::NAME.to_string();

        let mut methods: Vec<String> = self
            .methods
            .keys()
            .map(|path| path.trim_start_matches('/').to_string())
            .collect();
        methods.push(reflection_method.clone());
        methods.push("grpc.health.v1.Health/Check".to_string());
        methods.sort();

        self.register(&reflection_method, move |_req: ListMethodsRequest| {
            let service = service.clone();
            let methods = methods.clone();
            async move { Ok(ListMethodsResponse { service, methods }) }
        });
    }
}

impl<S: FabricService> Default for RpcServer<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten(
    joined: std::result::Result<
        std::result::Result<(), tonic::transport::Error>,
        tokio::task::JoinError,
    >,
) -> Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::Unavailable(format!("rpc server failed: {e}"))),
        Err(e) => Err(Error::Internal(format!("rpc server task failed: {e}"))),
    }
}

/// The tower service tonic routes to: one prefix per fabric service, with
/// every registered method dispatched by path. Unknown methods under the
/// prefix return `Unimplemented`, matching what tonic's router does for
/// unknown services.
struct FabricRouter<S: FabricService> {
    methods: Arc<HashMap<String, MethodHandler>>,
    _service: PhantomData<S>,
}

impl<S: FabricService> Clone for FabricRouter<S> {
    fn clone(&self) -> Self {
        Self {
            methods: Arc::clone(&self.methods),
            _service: PhantomData,
        }
    }
}

impl<S: FabricService> NamedService for FabricRouter<S> {
    const NAME: &'static str = S::NAME;
}

impl<S, B> Service<http::Request<B>> for FabricRouter<S>
where
    S: FabricService,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let handler = self.methods.get(req.uri().path()).cloned();
        match handler {
            Some(handler) => {
                struct MethodSvc(MethodHandler);
                impl UnaryService<Bytes> for MethodSvc {
                    type Response = Bytes;
                    type Future = BoxFuture<tonic::Response<Bytes>, Status>;

                    fn call(&mut self, request: tonic::Request<Bytes>) -> Self::Future {
                        let handler = Arc::clone(&self.0);
                        Box::pin(async move {
                            let payload = request.into_inner();
                            handler(payload).await.map(tonic::Response::new)
                        })
                    }
                }

                Box::pin(async move {
                    let mut grpc = Grpc::new(RawCodec);
                    Ok(grpc.unary(MethodSvc(handler), req).await)
                })
            }
            None => Box::pin(async move {
                Ok(http::Response::builder()
                    .status(200)
                    .header("grpc-status", (tonic::Code::Unimplemented as i32).to_string())
                    .header("content-type", "application/grpc")
                    .body(empty_body())
                    .unwrap())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::common::Empty;

    struct FixtureFabric;

    impl FabricService for FixtureFabric {
        const NAME: &'static str = "meridian.fixture.v1";
    }

    #[test]
    fn test_methods_are_keyed_by_wire_path() {
        let mut server = RpcServer::<FixtureFabric>::new();
        server.register("meridian.fixture.v1/Ping", |_req: Empty| async move {
            Ok(Empty {})
        });
        assert!(server.methods.contains_key("/meridian.fixture.v1/Ping"));
    }

    #[test]
    fn test_builtin_reflection_lists_registered_methods() {
        let mut server = RpcServer::<FixtureFabric>::new();
        server.register("meridian.fixture.v1/Ping", |_req: Empty| async move {
            Ok(Empty {})
        });
        server.register_builtins();
        assert!(server
            .methods
            .contains_key("/meridian.fixture.v1/ListMethods"));
    }
}
