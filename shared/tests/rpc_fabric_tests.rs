// ============================================================================
// MERIDIAN - RPC FABRIC TESTS
// ============================================================================
// Module: shared/tests/rpc_fabric_tests.rs
// Description: End-to-end fabric behaviour over loopback gRPC: typed calls,
//              status propagation, health, reflection, deadlines and
//              graceful shutdown
// ============================================================================

use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use meridian_shared::proto::common::{Empty, Page};
use meridian_shared::rpc::{Code, FabricService, RpcClient, RpcServer, Status};
use meridian_shared::Error;

const SERVICE: &str = "meridian.fixture.v1";

struct FixtureFabric;

impl FabricService for FixtureFabric {
    const NAME: &'static str = SERVICE;
}

async fn spawn(server: RpcServer<FixtureFabric>) -> (SocketAddr, CancellationToken) {
    let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let token = CancellationToken::new();
    let serve_token = token.clone();
    tokio::spawn(async move { server.serve(addr, serve_token).await });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    (addr, token)
}

fn test_server() -> RpcServer<FixtureFabric> {
    let mut server = RpcServer::new();

    // Doubles the page number; rejects page zero the way a real handler
    // maps domain errors into statuses.
    server.register("meridian.fixture.v1/Double", |req: Page| async move {
        if req.page == 0 {
            return Err(Status::from(Error::InvalidArgument(
                "page must be positive".to_string(),
            )));
        }
        Ok(Page {
            page: req.page * 2,
            ..req
        })
    });

    server.register("meridian.fixture.v1/Conflict", |_req: Empty| async move {
        Err::<Empty, Status>(Status::from(Error::OptimisticLockFailed(
            "stale version".to_string(),
        )))
    });

    server.register("meridian.fixture.v1/Slow", |_req: Empty| async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Empty {})
    });

    server
}

#[tokio::test]
async fn test_typed_call_round_trip() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    let response: Page = client
        .call(
            "meridian.fixture.v1/Double",
            &Page {
                page: 3,
                page_size: 20,
                ..Page::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(response.page, 6);
    assert_eq!(response.page_size, 20);

    token.cancel();
}

#[tokio::test]
async fn test_domain_errors_cross_as_statuses() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    let invalid: Result<Page, Status> = client
        .call("meridian.fixture.v1/Double", &Page::default())
        .await;
    assert_eq!(invalid.unwrap_err().code(), Code::InvalidArgument);

    let conflict: Result<Empty, Status> =
        client.call("meridian.fixture.v1/Conflict", &Empty {}).await;
    let status = conflict.unwrap_err();
    assert_eq!(status.code(), Code::Aborted);

    // Clients fold statuses back into the domain taxonomy.
    let err = Error::from(status);
    assert!(matches!(err, Error::OptimisticLockFailed(_)));

    token.cancel();
}

#[tokio::test]
async fn test_unknown_method_is_unimplemented() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    let unknown: Result<Empty, Status> =
        client.call("meridian.fixture.v1/Nope", &Empty {}).await;
    assert_eq!(unknown.unwrap_err().code(), Code::Unimplemented);

    token.cancel();
}

#[tokio::test]
async fn test_health_and_reflection() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    assert!(client.health_check().await.unwrap());

    let listing = client.list_methods(SERVICE).await.unwrap();
    assert_eq!(listing.service, SERVICE);
    assert!(listing
        .methods
        .iter()
        .any(|m| m == "meridian.fixture.v1/Double"));
    assert!(listing
        .methods
        .iter()
        .any(|m| m == "meridian.fixture.v1/ListMethods"));
    assert!(listing
        .methods
        .iter()
        .any(|m| m == "grpc.health.v1.Health/Check"));

    token.cancel();
}

#[tokio::test]
async fn test_deadline_is_enforced() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    let slow: Result<Empty, Status> = client
        .call_with_deadline("meridian.fixture.v1/Slow", &Empty {}, Duration::from_millis(100))
        .await;
    assert_eq!(slow.unwrap_err().code(), Code::DeadlineExceeded);

    token.cancel();
}

#[tokio::test]
async fn test_channel_survives_many_calls() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    for page in 1..=10 {
        let response: Page = client
            .call(
                "meridian.fixture.v1/Double",
                &Page {
                    page,
                    ..Page::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(response.page, page * 2);
    }

    client.close().await;
    // Closing is not terminal: the next call re-dials.
    let response: Page = client
        .call("meridian.fixture.v1/Double", &Page { page: 1, ..Page::default() })
        .await
        .unwrap();
    assert_eq!(response.page, 2);

    token.cancel();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (addr, token) = spawn(test_server()).await;
    let client = RpcClient::new(addr.to_string(), Duration::from_secs(1));

    let response: Page = client
        .call("meridian.fixture.v1/Double", &Page { page: 1, ..Page::default() })
        .await
        .unwrap();
    assert_eq!(response.page, 2);

    token.cancel();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let fresh = RpcClient::new(addr.to_string(), Duration::from_millis(250));
    let result: Result<Page, Status> = fresh
        .call("meridian.fixture.v1/Double", &Page { page: 1, ..Page::default() })
        .await;
    assert!(result.is_err());
}
