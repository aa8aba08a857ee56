//! Cluster repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use canopy_core::error::{AppError, ErrorKind};
use canopy_core::result::AppResult;
use canopy_entity::Cluster;

use crate::store::ClusterStore;

/// Read-only repository for clusters.
#[derive(Debug, Clone)]
pub struct ClusterRepository {
    pool: PgPool,
}

impl ClusterRepository {
    /// Create a new cluster repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClusterStore for ClusterRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Cluster>> {
        sqlx::query_as::<_, Cluster>("SELECT * FROM clusters WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to find cluster by name", e))
    }
}
