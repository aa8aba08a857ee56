//! Application repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use canopy_core::error::{AppError, ErrorKind};
use canopy_core::result::AppResult;
use canopy_core::types::ApplicationId;
use canopy_entity::Application;

use crate::store::ApplicationStore;

use super::like_pattern;

/// Read-only repository for applications.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for ApplicationRepository {
    async fn find_by_id(&self, id: ApplicationId) -> AppResult<Option<Application>> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to find application", e))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Application>> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Store, "Failed to find application by name", e)
            })
    }

    async fn find_by_name_fuzzy(&self, filter: &str) -> AppResult<Vec<Application>> {
        sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE name ILIKE $1 ESCAPE '\\' ORDER BY id ASC",
        )
        .bind(like_pattern(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to search applications", e))
    }
}
