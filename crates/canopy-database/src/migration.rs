//! Namespace schema migrations.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::{Migrate, Migrator};
use tracing::{debug, info};

use canopy_core::error::{AppError, ErrorKind};
use canopy_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Bring the namespace schema up to date. Returns the versions applied by
/// this call, oldest first.
pub async fn run_migrations(pool: &PgPool) -> AppResult<Vec<i64>> {
    let before = applied_versions(pool).await?;
    let known = known_versions();
    info!(
        known = known.len(),
        already_applied = before.len(),
        "Migrating namespace schema"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Store, "Failed to migrate namespace schema", e)
            .with_operation("migrate")
    })?;

    let applied: Vec<i64> = known
        .into_iter()
        .filter(|version| !before.contains(version))
        .collect();
    for version in &applied {
        debug!(version, "Applied migration");
    }
    info!(applied = applied.len(), "Namespace schema is up to date");
    Ok(applied)
}

/// Versions of the bundled up-migrations, oldest first.
fn known_versions() -> Vec<i64> {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| m.version)
        .collect()
}

async fn applied_versions(pool: &PgPool) -> AppResult<HashSet<i64>> {
    let store_error = |message: &'static str| {
        move |e: sqlx::migrate::MigrateError| {
            AppError::with_source(ErrorKind::Store, message, e).with_operation("migrate")
        }
    };

    let mut conn = pool.acquire().await.map_err(|e| {
        AppError::with_source(ErrorKind::Store, "Failed to acquire a connection", e)
            .with_operation("migrate")
    })?;
    conn.ensure_migrations_table()
        .await
        .map_err(store_error("Failed to prepare the migrations table"))?;
    let applied = conn
        .list_applied_migrations()
        .await
        .map_err(store_error("Failed to read applied migrations"))?;
    Ok(applied.into_iter().map(|m| m.version).collect())
}
