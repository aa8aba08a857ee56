//! Cluster entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use canopy_core::types::{ApplicationId, ClusterId};

/// A cluster of an application. Belongs transitively to one folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cluster {
    /// Unique cluster identifier.
    pub id: ClusterId,
    /// Cluster name; doubles as its path segment.
    pub name: String,
    /// Owning application.
    pub application_id: ApplicationId,
    /// When the cluster was created.
    pub created_at: DateTime<Utc>,
    /// When the cluster was last updated.
    pub updated_at: DateTime<Utc>,
}
