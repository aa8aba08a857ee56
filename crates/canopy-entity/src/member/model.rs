//! Member entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use canopy_core::types::UserId;

use super::role::Role;

/// Kind of resource a membership applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A folder (group).
    Group,
    /// An application.
    Application,
    /// A cluster.
    Cluster,
}

impl ResourceType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Application => "application",
            Self::Cluster => "cluster",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's role on one resource.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    /// Type of the resource.
    pub resource_type: ResourceType,
    /// Raw id of the resource.
    pub resource_id: i64,
    /// The member.
    pub user_id: UserId,
    /// The member's role on the resource.
    pub role: Role,
    /// When the membership was granted.
    pub created_at: DateTime<Utc>,
}
