// ============================================================================
// MERIDIAN - INVENTORY SERVER BINARY
// ============================================================================
// Module: src/bin/inventory_server.rs
// Description: Wires storage, the event bus, the inventory engine and the
//              reservation sweeper into one fabric service
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_inventory::repository::{
    PgInventoryRepository, PgLocationRepository, PgReservationRepository, PgTransferRepository,
};
use meridian_inventory::{build_rpc_server, InventoryService, ReservationSweeper};
use meridian_shared::config::INVENTORY_SERVICE_PORT;
use meridian_shared::database::{ConnectionPool, DatabaseConfig, HealthChecker, MigrationRunner};
use meridian_shared::events::{EventPublisher, InMemoryEventPublisher, RedisEventPublisher};
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
        match RedisEventPublisher::connect(&config.redis_url, "inventory", &config.environment)
            .await
        {
            Ok(publisher) => {
                info!("event publisher connected");
                Arc::new(publisher)
            }
            Err(e) => {
                warn!("event bus unavailable, events will not leave this process: {e}");
                InMemoryEventPublisher::new()
            }
        };

    let service = Arc::new(InventoryService::new(
        Arc::new(PgInventoryRepository::new(pool.pool().clone())),
        Arc::new(PgReservationRepository::new(pool.pool().clone())),
        Arc::new(PgTransferRepository::new(pool.pool().clone())),
        Arc::new(PgLocationRepository::new(pool.pool().clone())),
        events,
    ));

    let server = build_rpc_server(service.clone());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    // The sweeper belongs to the server lifecycle: started here, joined
    // after the fabric has drained.
    let sweeper = ReservationSweeper::new(Arc::clone(&service)).spawn(shutdown.child_token());

    let port = config.rpc_port.unwrap_or(INVENTORY_SERVICE_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    server.serve(addr, shutdown.clone()).await?;

    if let Err(e) = sweeper.await {
        warn!("sweeper join failed: {e}");
    }
    pool.close().await;
    info!("inventory server stopped");
    Ok(())
}
