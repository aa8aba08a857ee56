//! Application entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use canopy_core::types::{ApplicationId, FolderId};

/// A deployable application. Always owned by exactly one folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    /// Unique application identifier.
    pub id: ApplicationId,
    /// Application name; doubles as its path segment.
    pub name: String,
    /// Owning folder.
    pub group_id: FolderId,
    /// When the application was created.
    pub created_at: DateTime<Utc>,
    /// When the application was last updated.
    pub updated_at: DateTime<Utc>,
}
