//! Liveness probe for the storage layer.

use sqlx::{PgPool, Row};
use std::time::{Duration, Instant};

use super::DbResult;

pub struct HealthChecker {
    pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct DatabaseHealth {
    pub healthy: bool,
    pub latency: Duration,
    pub pool_size: u32,
    pub idle_connections: usize,
}

impl HealthChecker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn check(&self) -> DbResult<DatabaseHealth> {
        let started = Instant::now();
        let row = sqlx::query("SELECT 1 AS ok").fetch_one(&self.pool).await?;
        let ok: i32 = row.try_get("ok")?;

        Ok(DatabaseHealth {
            healthy: ok == 1,
            latency: started.elapsed(),
            pool_size: self.pool.size(),
            idle_connections: self.pool.num_idle(),
        })
    }
}
