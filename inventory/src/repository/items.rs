//! Postgres stock record repository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use meridian_shared::types::PageRequest;
use meridian_shared::{Error, Result};

use super::InventoryRepository;
use crate::models::{InventoryItem, StockMovement};

const ITEM_COLUMNS: &str = "id, product_id, sku, location_id, quantity, reserved, \
     reorder_threshold, reorder_amount, deleted_at, created_at, last_updated";

#[derive(Clone)]
pub struct PgInventoryRepository {
    pool: PgPool,
}

impl PgInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists_live(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM inventory_items WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn record_movement(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        item_id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO stock_movements (id, inventory_item_id, delta, reason, actor_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(item_id)
        .bind(delta)
        .bind(reason)
        .bind(actor_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn create(&self, item: &InventoryItem) -> Result<InventoryItem> {
        let sql = format!(
            "INSERT INTO inventory_items \
             (id, product_id, sku, location_id, quantity, reserved, reorder_threshold, \
              reorder_amount, created_at, last_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(item.id)
            .bind(item.product_id)
            .bind(&item.sku)
            .bind(item.location_id)
            .bind(item.quantity)
            .bind(item.reserved)
            .bind(item.reorder_threshold)
            .bind(item.reorder_amount)
            .bind(item.created_at)
            .bind(item.last_updated)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::from_unique_violation(
                    e,
                    &format!(
                        "inventory item for product {} at location {}",
                        item.product_id, item.location_id
                    ),
                )
            })
    }

    async fn get(&self, id: Uuid) -> Result<Option<InventoryItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1 AND deleted_at IS NULL"
        );
        Ok(sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_by_product(
        &self,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<InventoryItem>> {
        let item = match location_id {
            Some(location_id) => {
                let sql = format!(
                    "SELECT {ITEM_COLUMNS} FROM inventory_items \
                     WHERE product_id = $1 AND location_id = $2 AND deleted_at IS NULL"
                );
                sqlx::query_as::<_, InventoryItem>(&sql)
                    .bind(product_id)
                    .bind(location_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {ITEM_COLUMNS} FROM inventory_items \
                     WHERE product_id = $1 AND deleted_at IS NULL \
                     ORDER BY created_at LIMIT 1"
                );
                sqlx::query_as::<_, InventoryItem>(&sql)
                    .bind(product_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(item)
    }

    async fn list(
        &self,
        location_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<InventoryItem>, i64)> {
        let deleted_clause = if page.include_deleted {
            "TRUE"
        } else {
            "deleted_at IS NULL"
        };
        let location_clause = if location_id.is_some() {
            "location_id = $1"
        } else {
            "TRUE"
        };

        let sort = page.sort_field(&["created_at", "last_updated", "quantity", "sku"], "created_at");
        let direction = page.sort_direction();
        let list_sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE {deleted_clause} AND {location_clause} \
             ORDER BY {sort} {direction} LIMIT ${} OFFSET ${}",
            if location_id.is_some() { 2 } else { 1 },
            if location_id.is_some() { 3 } else { 2 },
        );
        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM inventory_items \
             WHERE {deleted_clause} AND {location_clause}"
        );

        let (items, count_row) = match location_id {
            Some(location_id) => {
                let items = sqlx::query_as::<_, InventoryItem>(&list_sql)
                    .bind(location_id)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count = sqlx::query(&count_sql)
                    .bind(location_id)
                    .fetch_one(&self.pool)
                    .await?;
                (items, count)
            }
            None => {
                let items = sqlx::query_as::<_, InventoryItem>(&list_sql)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count = sqlx::query(&count_sql).fetch_one(&self.pool).await?;
                (items, count)
            }
        };

        let total: i64 = count_row.try_get("total").map_err(Error::Database)?;
        Ok((items, total))
    }

    async fn add_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        if delta <= 0 {
            return Err(Error::InvalidArgument("delta must be positive".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "UPDATE inventory_items SET quantity = quantity + $2, last_updated = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {ITEM_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(item) = updated else {
            return Err(Error::NotFound(format!("inventory item {id}")));
        };

        Self::record_movement(&mut tx, id, delta, reason, actor_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn remove_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        if delta <= 0 {
            return Err(Error::InvalidArgument("delta must be positive".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        // The invariant lives in the predicate: quantity may never drop
        // below reserved, so only free units can be removed.
        let sql = format!(
            "UPDATE inventory_items SET quantity = quantity - $2, last_updated = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND quantity - reserved >= $2 \
             RETURNING {ITEM_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(item) = updated else {
            return if self.exists_live(id).await? {
                Err(Error::InsufficientStock(format!(
                    "cannot remove {delta} units from item {id}"
                )))
            } else {
                Err(Error::NotFound(format!("inventory item {id}")))
            };
        };

        Self::record_movement(&mut tx, id, -delta, reason, actor_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn adjust(
        &self,
        id: Uuid,
        new_quantity: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        if new_quantity < 0 {
            return Err(Error::InvalidArgument(
                "quantity must not be negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        // Row-locked read for the movement delta; the invariant predicate
        // still guards the write itself.
        let before = sqlx::query(
            "SELECT quantity FROM inventory_items \
             WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(before) = before else {
            return Err(Error::NotFound(format!("inventory item {id}")));
        };
        let old_quantity: i32 = before.try_get("quantity").map_err(Error::Database)?;

        let sql = format!(
            "UPDATE inventory_items SET quantity = $2, last_updated = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND reserved <= $2 \
             RETURNING {ITEM_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .bind(new_quantity)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(item) = updated else {
            return Err(Error::InsufficientStock(format!(
                "cannot adjust item {id} below its reserved count"
            )));
        };

        Self::record_movement(&mut tx, id, new_quantity - old_quantity, reason, actor_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE inventory_items SET deleted_at = NOW(), last_updated = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("inventory item {id}")));
        }
        Ok(())
    }

    async fn movements(&self, item_id: Uuid, page: &PageRequest) -> Result<Vec<StockMovement>> {
        Ok(sqlx::query_as::<_, StockMovement>(
            "SELECT id, inventory_item_id, delta, reason, actor_id, reference_id, created_at \
             FROM stock_movements WHERE inventory_item_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(item_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?)
    }
}
