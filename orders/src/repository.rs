// ============================================================================
// MERIDIAN - ORDER REPOSITORY
// ============================================================================
// Module: orders/src/repository.rs
// Description: Order persistence port, its Postgres implementation and the
//              in-memory implementation used by tests
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use meridian_shared::types::{Address, PageRequest};
use meridian_shared::{Error, Result};

use crate::models::{Order, OrderItem, OrderSource, OrderStatus, Payment};

/// Order aggregate port.
///
/// `update_with_version` is the optimistic-locking primitive: a conditional
/// write matching both primary key and expected version at the storage
/// layer. Read-then-write simulation is not an implementation option.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> Result<Order>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>>;

    /// Persist the mutated order iff the stored version still equals
    /// `expected_version`; the stored version becomes `expected_version + 1`.
    /// Fails `optimistic_lock_failed` on mismatch, leaving state untouched.
    async fn update_with_version(&self, order: &Order, expected_version: i32) -> Result<Order>;

    async fn list_for_user(&self, user_id: Uuid, page: &PageRequest)
        -> Result<(Vec<Order>, i64)>;

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)>;

    async fn count_by_status(&self, status: OrderStatus) -> Result<i64>;
}

// ============================================================================
// POSTGRES IMPLEMENTATION
// ============================================================================

const ORDER_COLUMNS: &str = "id, user_id, items, total_amount, currency, status, source, \
     shipping_address, billing_address, payment, tracking_code, notes, version, \
     created_at, updated_at, completed_at, location_id, staff_id";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: serde_json::Value,
    total_amount: Decimal,
    currency: String,
    status: OrderStatus,
    source: OrderSource,
    shipping_address: Option<serde_json::Value>,
    billing_address: Option<serde_json::Value>,
    payment: Option<serde_json::Value>,
    tracking_code: Option<String>,
    notes: serde_json::Value,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    location_id: Option<Uuid>,
    staff_id: Option<Uuid>,
}

fn row_to_order(row: OrderRow) -> Result<Order> {
    let items: Vec<OrderItem> = serde_json::from_value(row.items).map_err(Error::Serialization)?;
    let shipping_address: Option<Address> = row
        .shipping_address
        .map(serde_json::from_value)
        .transpose()
        .map_err(Error::Serialization)?;
    let billing_address: Option<Address> = row
        .billing_address
        .map(serde_json::from_value)
        .transpose()
        .map_err(Error::Serialization)?;
    let payment: Option<Payment> = row
        .payment
        .map(serde_json::from_value)
        .transpose()
        .map_err(Error::Serialization)?;
    let notes: Vec<String> = serde_json::from_value(row.notes).map_err(Error::Serialization)?;

    Ok(Order {
        id: row.id,
        user_id: row.user_id,
        items,
        total_amount: row.total_amount,
        currency: row.currency,
        status: row.status,
        source: row.source,
        shipping_address,
        billing_address,
        payment,
        tracking_code: row.tracking_code,
        notes,
        version: row.version,
        created_at: row.created_at,
        updated_at: row.updated_at,
        completed_at: row.completed_at,
        location_id: row.location_id,
        staff_id: row.staff_id,
    })
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> Result<Order> {
        let sql = format!(
            "INSERT INTO orders \
             (id, user_id, items, total_amount, currency, status, source, shipping_address, \
              billing_address, payment, tracking_code, notes, version, created_at, updated_at, \
              completed_at, location_id, staff_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.id)
            .bind(order.user_id)
            .bind(serde_json::to_value(&order.items).map_err(Error::Serialization)?)
            .bind(order.total_amount)
            .bind(&order.currency)
            .bind(order.status)
            .bind(order.source)
            .bind(
                order
                    .shipping_address
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Error::Serialization)?,
            )
            .bind(
                order
                    .billing_address
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Error::Serialization)?,
            )
            .bind(
                order
                    .payment
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Error::Serialization)?,
            )
            .bind(order.tracking_code.as_deref())
            .bind(serde_json::to_value(&order.notes).map_err(Error::Serialization)?)
            .bind(order.version)
            .bind(order.created_at)
            .bind(order.updated_at)
            .bind(order.completed_at)
            .bind(order.location_id)
            .bind(order.staff_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from_unique_violation(e, &format!("order {}", order.id)))?;
        row_to_order(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_order).transpose()
    }

    async fn update_with_version(&self, order: &Order, expected_version: i32) -> Result<Order> {
        let sql = format!(
            "UPDATE orders SET \
             items = $3, total_amount = $4, status = $5, shipping_address = $6, \
             billing_address = $7, payment = $8, tracking_code = $9, notes = $10, \
             completed_at = $11, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.id)
            .bind(expected_version)
            .bind(serde_json::to_value(&order.items).map_err(Error::Serialization)?)
            .bind(order.total_amount)
            .bind(order.status)
            .bind(
                order
                    .shipping_address
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Error::Serialization)?,
            )
            .bind(
                order
                    .billing_address
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Error::Serialization)?,
            )
            .bind(
                order
                    .payment
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Error::Serialization)?,
            )
            .bind(order.tracking_code.as_deref())
            .bind(serde_json::to_value(&order.notes).map_err(Error::Serialization)?)
            .bind(order.completed_at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_order(row),
            None => {
                let exists = sqlx::query("SELECT 1 AS one FROM orders WHERE id = $1")
                    .bind(order.id)
                    .fetch_optional(&self.pool)
                    .await?;
                if exists.is_some() {
                    Err(Error::OptimisticLockFailed(format!(
                        "order {} changed past version {expected_version}",
                        order.id
                    )))
                } else {
                    Err(Error::NotFound(format!("order {}", order.id)))
                }
            }
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        let sort = page.sort_field(&["created_at", "updated_at", "total_amount"], "created_at");
        let direction = page.sort_direction();
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY {sort} {direction} LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
            .try_get("total")
            .map_err(Error::Database)?;

        let orders = rows.into_iter().map(row_to_order).collect::<Result<_>>()?;
        Ok((orders, total))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        let sort = page.sort_field(&["created_at", "updated_at", "total_amount"], "created_at");
        let direction = page.sort_direction();
        let (rows, count_row) = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 \
                     ORDER BY {sort} {direction} LIMIT $2 OFFSET $3"
                );
                let rows = sqlx::query_as::<_, OrderRow>(&sql)
                    .bind(status)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count = sqlx::query("SELECT COUNT(*) AS total FROM orders WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?;
                (rows, count)
            }
            None => {
                let sql = format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     ORDER BY {sort} {direction} LIMIT $1 OFFSET $2"
                );
                let rows = sqlx::query_as::<_, OrderRow>(&sql)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count = sqlx::query("SELECT COUNT(*) AS total FROM orders")
                    .fetch_one(&self.pool)
                    .await?;
                (rows, count)
            }
        };

        let total: i64 = count_row.try_get("total").map_err(Error::Database)?;
        let orders = rows.into_iter().map(row_to_order).collect::<Result<_>>()?;
        Ok((orders, total))
    }

    async fn count_by_status(&self, status: OrderStatus) -> Result<i64> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM orders WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?
            .try_get("total")
            .map_err(Error::Database)?;
        Ok(total)
    }
}

// ============================================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================================

/// In-memory order store with the same CAS semantics, for hermetic tests.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Order>> {
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<Order> {
        let mut orders = self.lock();
        if orders.contains_key(&order.id) {
            return Err(Error::AlreadyExists(format!("order {}", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn update_with_version(&self, order: &Order, expected_version: i32) -> Result<Order> {
        let mut orders = self.lock();
        let Some(stored) = orders.get_mut(&order.id) else {
            return Err(Error::NotFound(format!("order {}", order.id)));
        };
        if stored.version != expected_version {
            return Err(Error::OptimisticLockFailed(format!(
                "order {} changed past version {expected_version}",
                order.id
            )));
        }

        let mut updated = order.clone();
        updated.version = expected_version + 1;
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        let orders = self.lock();
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let paged = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((paged, total))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        let orders = self.lock();
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let paged = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((paged, total))
    }

    async fn count_by_status(&self, status: OrderStatus) -> Result<i64> {
        Ok(self
            .lock()
            .values()
            .filter(|o| o.status == status)
            .count() as i64)
    }
}
