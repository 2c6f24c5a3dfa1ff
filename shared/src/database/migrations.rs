// ============================================================================
// MERIDIAN - DATABASE MIGRATION RUNNER
// ============================================================================
// Module: shared/src/database/migrations.rs
// Description: Applies the SQL migrations shipped with the workspace
// ============================================================================

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::path::Path;
use tracing::{error, info};

use super::DbResult;

/// Migration runner for database schema updates
pub struct MigrationRunner {
    pool: PgPool,
    migrations_path: String,
}

impl MigrationRunner {
    pub fn new(pool: PgPool, migrations_path: Option<String>) -> Self {
        let migrations_path = migrations_path.unwrap_or_else(|| "./migrations".to_string());
        Self {
            pool,
            migrations_path,
        }
    }

    /// Run all pending migrations
    pub async fn run(&self) -> DbResult<()> {
        info!("running database migrations from {}", self.migrations_path);

        let migrator = Migrator::new(Path::new(&self.migrations_path))
            .await
            .map_err(|e| {
                error!("failed to load migrations: {}", e);
                sqlx::Error::Migrate(Box::new(e))
            })?;

        migrator.run(&self.pool).await.map_err(|e| {
            error!("failed to run migrations: {}", e);
            e
        })?;

        info!("database migrations completed");
        Ok(())
    }

    /// List known migrations and whether each has been applied.
    pub async fn status(&self) -> DbResult<Vec<MigrationInfo>> {
        let migrator = Migrator::new(Path::new(&self.migrations_path))
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

        let applied: Vec<(i64,)> =
            sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
                .fetch_all(&self.pool)
                .await
                .unwrap_or_default();

        Ok(migrator
            .migrations
            .iter()
            .map(|m| MigrationInfo {
                version: m.version,
                description: m.description.to_string(),
                is_applied: applied.iter().any(|(v,)| *v == m.version),
            })
            .collect())
    }
}

/// Information about a migration
#[derive(Debug, Clone)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub is_applied: bool,
}

impl std::fmt::Display for MigrationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.is_applied { "APPLIED" } else { "PENDING" };
        write!(f, "{:03} | {} | {}", self.version, status, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_info_display() {
        let info = MigrationInfo {
            version: 1,
            description: "Initial schema".to_string(),
            is_applied: true,
        };

        let display = format!("{}", info);
        assert!(display.contains("001"));
        assert!(display.contains("APPLIED"));
        assert!(display.contains("Initial schema"));
    }
}
