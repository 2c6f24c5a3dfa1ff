//! Postgres reservation repository.
//!
//! Reservation creation and termination touch both the reservations table
//! and the owning item's `reserved` counter inside one transaction, so the
//! sum of active reservations always equals the counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use meridian_shared::{Error, Result};

use super::ReservationRepository;
use crate::models::{Reservation, ReservationStatus};

const RESERVATION_COLUMNS: &str =
    "id, inventory_item_id, order_id, quantity, status, reserved_at, expires_at";

#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_active(
        &self,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE order_id = $1 AND inventory_item_id = $2 AND status = 'active'"
        );
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .bind(order_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn reserve(
        &self,
        item_id: Uuid,
        order_id: Uuid,
        quantity: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Reservation> {
        if quantity <= 0 {
            return Err(Error::InvalidArgument(
                "reservation quantity must be positive".to_string(),
            ));
        }

        // Idempotency fast path: a second call for the same (order, item)
        // returns the existing hold unchanged.
        if let Some(existing) = self.find_active(order_id, item_id).await? {
            return Ok(existing);
        }

        let mut tx = self.pool.begin().await?;

        let counter = sqlx::query(
            "UPDATE inventory_items SET reserved = reserved + $2, last_updated = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND quantity - reserved >= $2",
        )
        .bind(item_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if counter.rows_affected() == 0 {
            let exists = sqlx::query(
                "SELECT 1 AS one FROM inventory_items WHERE id = $1 AND deleted_at IS NULL",
            )
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
            return if exists.is_some() {
                Err(Error::InsufficientStock(format!(
                    "cannot reserve {quantity} units of item {item_id}"
                )))
            } else {
                Err(Error::NotFound(format!("inventory item {item_id}")))
            };
        }

        let insert_sql = format!(
            "INSERT INTO reservations \
             (id, inventory_item_id, order_id, quantity, status, reserved_at, expires_at) \
             VALUES ($1, $2, $3, $4, 'active', NOW(), $5) \
             RETURNING {RESERVATION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Reservation>(&insert_sql)
            .bind(Uuid::new_v4())
            .bind(item_id)
            .bind(order_id)
            .bind(quantity)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(reservation) => {
                tx.commit().await?;
                Ok(reservation)
            }
            Err(e) => {
                // A racing call for the same (order, item) won the unique
                // index; rolling back reverts our counter increment and the
                // winner's reservation is the answer.
                tx.rollback().await.ok();
                if let Error::AlreadyExists(_) = Error::from_unique_violation(e, "reservation") {
                    self.find_active(order_id, item_id).await?.ok_or_else(|| {
                        Error::Internal("racing reservation vanished".to_string())
                    })
                } else {
                    Err(Error::Internal(
                        "reservation insert failed".to_string(),
                    ))
                }
            }
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn terminate(&self, id: Uuid, terminal: ReservationStatus) -> Result<Reservation> {
        if !terminal.is_terminal() {
            return Err(Error::InvalidArgument(
                "terminate requires a terminal status".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // Status CAS: only an active reservation transitions; a repeat call
        // finds no active row and falls through to the idempotent read.
        let update_sql = format!(
            "UPDATE reservations SET status = $2 WHERE id = $1 AND status = 'active' \
             RETURNING {RESERVATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Reservation>(&update_sql)
            .bind(id)
            .bind(terminal)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(reservation) = updated else {
            drop(tx);
            return self
                .get(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("reservation {id}")));
        };

        let counter_sql = match terminal {
            // Fulfilment converts the hold into a permanent deduction.
            ReservationStatus::Fulfilled => {
                "UPDATE inventory_items \
                 SET reserved = reserved - $2, quantity = quantity - $2, last_updated = NOW() \
                 WHERE id = $1 AND reserved >= $2 AND quantity >= $2"
            }
            // Release and expiry give the units back to availability.
            _ => {
                "UPDATE inventory_items \
                 SET reserved = reserved - $2, last_updated = NOW() \
                 WHERE id = $1 AND reserved >= $2"
            }
        };
        let counter = sqlx::query(counter_sql)
            .bind(reservation.inventory_item_id)
            .bind(reservation.quantity)
            .execute(&mut *tx)
            .await?;

        if counter.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(Error::Internal(format!(
                "reservation {id} counters out of sync with item {}",
                reservation.inventory_item_id
            )));
        }

        tx.commit().await?;
        Ok(reservation)
    }

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE order_id = $1 ORDER BY reserved_at"
        );
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE status = 'active' AND expires_at < $1 \
             ORDER BY expires_at LIMIT $2"
        );
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }
}
