//! Membership lookups backed by the `members` table.

use async_trait::async_trait;
use sqlx::PgPool;

use canopy_core::error::{AppError, ErrorKind};
use canopy_core::result::AppResult;
use canopy_core::types::UserId;
use canopy_entity::{ResourceType, Role};

use crate::store::MembershipProvider;

/// Membership provider reading roles from PostgreSQL.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipProvider for MemberRepository {
    async fn get_role(
        &self,
        user: UserId,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> AppResult<Option<Role>> {
        sqlx::query_scalar::<_, Role>(
            "SELECT role FROM members \
             WHERE resource_type = $1 AND resource_id = $2 AND user_id = $3",
        )
        .bind(resource_type)
        .bind(resource_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to look up member role", e))
    }
}
