//! Postgres transfer repository. Status moves are CAS updates keyed on the
//! prior status, so two racing actors cannot both advance a transfer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use meridian_shared::types::PageRequest;
use meridian_shared::{Error, Result};

use super::TransferRepository;
use crate::models::{Transfer, TransferStatus};

const TRANSFER_COLUMNS: &str = "id, product_id, sku, source_location_id, dest_location_id, \
     quantity, status, requested_by, approved_by, estimated_arrival, requested_at, updated_at";

#[derive(Clone)]
pub struct PgTransferRepository {
    pool: PgPool,
}

impl PgTransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransferRepository for PgTransferRepository {
    async fn create(&self, transfer: &Transfer) -> Result<Transfer> {
        let sql = format!(
            "INSERT INTO transfers \
             (id, product_id, sku, source_location_id, dest_location_id, quantity, status, \
              requested_by, requested_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {TRANSFER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Transfer>(&sql)
            .bind(transfer.id)
            .bind(transfer.product_id)
            .bind(&transfer.sku)
            .bind(transfer.source_location_id)
            .bind(transfer.dest_location_id)
            .bind(transfer.quantity)
            .bind(transfer.status)
            .bind(transfer.requested_by)
            .bind(transfer.requested_at)
            .bind(transfer.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transfer>> {
        let sql = format!("SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = $1");
        Ok(sqlx::query_as::<_, Transfer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: TransferStatus,
        to: TransferStatus,
        approved_by: Option<Uuid>,
        estimated_arrival: Option<DateTime<Utc>>,
    ) -> Result<Option<Transfer>> {
        let sql = format!(
            "UPDATE transfers SET status = $3, \
             approved_by = COALESCE($4, approved_by), \
             estimated_arrival = COALESCE($5, estimated_arrival), \
             updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {TRANSFER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Transfer>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(approved_by)
            .bind(estimated_arrival)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(
        &self,
        status: Option<TransferStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Transfer>, i64)> {
        let sort = page.sort_field(&["requested_at", "updated_at", "quantity"], "requested_at");
        let direction = page.sort_direction();
        let (transfers, count_row) = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {TRANSFER_COLUMNS} FROM transfers WHERE status = $1 \
                     ORDER BY {sort} {direction} LIMIT $2 OFFSET $3"
                );
                let transfers = sqlx::query_as::<_, Transfer>(&sql)
                    .bind(status)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count =
                    sqlx::query("SELECT COUNT(*) AS total FROM transfers WHERE status = $1")
                        .bind(status)
                        .fetch_one(&self.pool)
                        .await?;
                (transfers, count)
            }
            None => {
                let sql = format!(
                    "SELECT {TRANSFER_COLUMNS} FROM transfers \
                     ORDER BY {sort} {direction} LIMIT $1 OFFSET $2"
                );
                let transfers = sqlx::query_as::<_, Transfer>(&sql)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count = sqlx::query("SELECT COUNT(*) AS total FROM transfers")
                    .fetch_one(&self.pool)
                    .await?;
                (transfers, count)
            }
        };

        let total: i64 = count_row.try_get("total").map_err(Error::Database)?;
        Ok((transfers, total))
    }
}
