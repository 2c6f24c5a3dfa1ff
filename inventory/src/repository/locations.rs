//! Postgres store location repository. The postal address is stored as a
//! JSONB document and converted at the row boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use meridian_shared::types::{Address, PageRequest};
use meridian_shared::{Error, Result};

use super::LocationRepository;
use crate::models::{StoreLocation, UpdateLocationRequest};

const LOCATION_COLUMNS: &str =
    "id, name, location_type, address, latitude, longitude, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    location_type: String,
    address: Option<serde_json::Value>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_model(row: LocationRow) -> Result<StoreLocation> {
    let address: Option<Address> = row
        .address
        .map(serde_json::from_value)
        .transpose()
        .map_err(Error::Serialization)?;
    Ok(StoreLocation {
        id: row.id,
        name: row.name,
        location_type: row.location_type,
        address,
        latitude: row.latitude,
        longitude: row.longitude,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(Clone)]
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn create(&self, location: &StoreLocation) -> Result<StoreLocation> {
        let address_json = location
            .address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(Error::Serialization)?;

        let sql = format!(
            "INSERT INTO store_locations \
             (id, name, location_type, address, latitude, longitude, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LOCATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(location.id)
            .bind(&location.name)
            .bind(&location.location_type)
            .bind(address_json)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(location.is_active)
            .bind(location.created_at)
            .bind(location.updated_at)
            .fetch_one(&self.pool)
            .await?;
        row_to_model(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoreLocation>> {
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM store_locations WHERE id = $1");
        let row = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_model).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateLocationRequest,
    ) -> Result<Option<StoreLocation>> {
        let address_json = update
            .address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(Error::Serialization)?;

        let sql = format!(
            "UPDATE store_locations SET \
             name = COALESCE($2, name), \
             location_type = COALESCE($3, location_type), \
             address = COALESCE($4, address), \
             latitude = COALESCE($5, latitude), \
             longitude = COALESCE($6, longitude), \
             is_active = COALESCE($7, is_active), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {LOCATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.location_type.as_deref())
            .bind(address_json)
            .bind(update.latitude)
            .bind(update.longitude)
            .bind(update.is_active)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_model).transpose()
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE store_locations SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        include_inactive: bool,
        page: &PageRequest,
    ) -> Result<(Vec<StoreLocation>, i64)> {
        let active_clause = if include_inactive {
            "TRUE"
        } else {
            "is_active"
        };

        let sort = page.sort_field(&["created_at", "updated_at", "name"], "created_at");
        let direction = page.sort_direction();
        let list_sql = format!(
            "SELECT {LOCATION_COLUMNS} FROM store_locations WHERE {active_clause} \
             ORDER BY {sort} {direction} LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, LocationRow>(&list_sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql =
            format!("SELECT COUNT(*) AS total FROM store_locations WHERE {active_clause}");
        let total: i64 = sqlx::query(&count_sql)
            .fetch_one(&self.pool)
            .await?
            .try_get("total")
            .map_err(Error::Database)?;

        let locations = rows
            .into_iter()
            .map(row_to_model)
            .collect::<Result<Vec<_>>>()?;
        Ok((locations, total))
    }

    async fn list_active_geocoded(&self) -> Result<Vec<StoreLocation>> {
        let sql = format!(
            "SELECT {LOCATION_COLUMNS} FROM store_locations \
             WHERE is_active AND latitude IS NOT NULL AND longitude IS NOT NULL \
             ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, LocationRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_model).collect()
    }
}
