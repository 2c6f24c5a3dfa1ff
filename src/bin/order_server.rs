// ============================================================================
// MERIDIAN - ORDER SERVER BINARY
// ============================================================================
// Module: src/bin/order_server.rs
// Description: Wires storage, the event bus, the order engine, the
//              inventory coordinator and its event subscription into one
//              fabric service
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_orders::repository::PgOrderRepository;
use meridian_orders::event_handlers::ReservationSettlementHandler;
use meridian_orders::{build_rpc_server, OrderInventoryCoordinator, OrderService};
use meridian_shared::clients::{ClientConfig, InventoryClient};
use meridian_shared::config::ORDER_SERVICE_PORT;
use meridian_shared::database::{ConnectionPool, DatabaseConfig, HealthChecker, MigrationRunner};
use meridian_shared::events::{
    EventPublisher, EventSubscriber, InMemoryEventPublisher, RedisEventPublisher,
    SubscriptionConfig, ORDER_EVENTS,
};
use meridian_shared::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("meridian={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = ConnectionPool::new(DatabaseConfig::new(&config.database_url)).await?;
    MigrationRunner::new(pool.pool().clone(), None).run().await?;

    // Fail fast if storage is not actually reachable end to end.
    let health = HealthChecker::new(pool.pool().clone()).check().await?;
    info!(latency_ms = health.latency.as_millis() as u64, "storage reachable");

    let events: Arc<dyn EventPublisher> =
        match RedisEventPublisher::connect(&config.redis_url, "orders", &config.environment).await {
            Ok(publisher) => {
                info!("event publisher connected");
                Arc::new(publisher)
            }
            Err(e) => {
                warn!("event bus unavailable, events will not leave this process: {e}");
                InMemoryEventPublisher::new()
            }
        };

    let service = Arc::new(OrderService::new(
        Arc::new(PgOrderRepository::new(pool.pool().clone())),
        events,
    ));

    let inventory = Arc::new(InventoryClient::new(ClientConfig::new(
        config.services.inventory.clone(),
    )));
    let coordinator = Arc::new(OrderInventoryCoordinator::new(
        Arc::clone(&service),
        inventory,
    ));

    // Reservation settlement reacts to our own delivered/cancelled events.
    let mut subscriber = match EventSubscriber::connect(
        &config.redis_url,
        SubscriptionConfig {
            group: "order-coordinator".to_string(),
            streams: vec![ORDER_EVENTS.to_string()],
            ..SubscriptionConfig::default()
        },
    )
    .await
    {
        Ok(subscriber) => Some(subscriber),
        Err(e) => {
            warn!("event subscriber unavailable, reservation settlement disabled: {e}");
            None
        }
    };
    if let Some(subscriber) = subscriber.as_mut() {
        subscriber.register_handler(Arc::new(ReservationSettlementHandler::new(Arc::clone(
            &coordinator,
        ))));
        subscriber.start().await?;
    }

    let server = build_rpc_server(service, coordinator);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    let port = config.rpc_port.unwrap_or(ORDER_SERVICE_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    server.serve(addr, shutdown.clone()).await?;

    if let Some(subscriber) = subscriber {
        subscriber.shutdown().await;
    }
    pool.close().await;
    info!("order server stopped");
    Ok(())
}
