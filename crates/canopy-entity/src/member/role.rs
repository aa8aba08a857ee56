//! Member role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a user can hold on a folder, application, or cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control over the resource.
    Owner,
    /// Manages the resource and its members.
    Maintainer,
    /// Project engineer; operates deployments.
    Pe,
    /// Develops and deploys within the resource.
    Developer,
    /// Read-only access.
    Guest,
}

impl Role {
    /// Whether a member with this role is shown the folder in an
    /// authorized folder listing.
    pub fn sees_folder(&self) -> bool {
        matches!(self, Self::Owner | Self::Maintainer | Self::Pe)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Maintainer => "maintainer",
            Self::Pe => "pe",
            Self::Developer => "developer",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = canopy_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "maintainer" => Ok(Self::Maintainer),
            "pe" => Ok(Self::Pe),
            "developer" => Ok(Self::Developer),
            "guest" => Ok(Self::Guest),
            _ => Err(canopy_core::AppError::validation(format!(
                "Invalid member role: '{s}'. Expected one of: owner, maintainer, pe, developer, guest"
            ))),
        }
    }
}
