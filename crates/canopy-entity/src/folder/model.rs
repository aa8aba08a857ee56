//! Folder entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::{FolderId, UserId};

use super::traversal::TraversalIds;

/// Who can see a folder.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "visibility_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisibilityLevel {
    /// Visible to members only.
    #[default]
    Private,
    /// Visible to every signed-in user.
    Internal,
    /// Visible to everyone.
    Public,
}

impl VisibilityLevel {
    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for VisibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VisibilityLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "internal" => Ok(Self::Internal),
            "public" => Ok(Self::Public),
            _ => Err(AppError::validation(format!(
                "Invalid visibility level: '{s}'. Expected one of: private, internal, public"
            ))),
        }
    }
}

/// A folder (group) in the namespace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Display name, unique among siblings.
    pub name: String,
    /// Single slash-free path segment, unique among siblings.
    pub path: String,
    /// Free-form description.
    pub description: String,
    /// Visibility of the folder.
    pub visibility_level: VisibilityLevel,
    /// Parent folder ID ([`FolderId::ROOT`] for top-level folders).
    pub parent_id: FolderId,
    /// Serialized root-to-self id chain; see [`TraversalIds`].
    pub traversal_ids: String,
    /// User who created the folder.
    pub created_by: UserId,
    /// User who last changed the folder.
    pub updated_by: UserId,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Decode this folder's ancestor chain.
    pub fn traversal(&self) -> AppResult<TraversalIds> {
        TraversalIds::decode(&self.traversal_ids)
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFolder {
    /// Display name.
    #[validate(length(min = 1, max = 128), custom(function = "validate_name"))]
    pub name: String,
    /// Path segment.
    #[validate(length(min = 1, max = 64), custom(function = "validate_path_segment"))]
    pub path: String,
    /// Parent folder ([`FolderId::ROOT`] for a top-level folder).
    #[serde(default)]
    pub parent_id: FolderId,
    /// Visibility of the folder.
    #[serde(default)]
    pub visibility_level: VisibilityLevel,
    /// Free-form description.
    #[serde(default)]
    #[validate(length(max = 512))]
    pub description: String,
}

/// Basic fields of an existing folder that may be changed in place.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFolder {
    /// Display name.
    #[validate(length(min = 1, max = 128), custom(function = "validate_name"))]
    pub name: String,
    /// Path segment.
    #[validate(length(min = 1, max = 64), custom(function = "validate_path_segment"))]
    pub path: String,
    /// Visibility of the folder.
    #[serde(default)]
    pub visibility_level: VisibilityLevel,
    /// Free-form description.
    #[serde(default)]
    #[validate(length(max = 512))]
    pub description: String,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(ValidationError::new("folder_name"));
    }
    Ok(())
}

/// A path segment is a slug: ASCII letters, digits, `-`, `_` and `.`, not
/// starting with a separator character.
fn validate_path_segment(path: &str) -> Result<(), ValidationError> {
    let mut chars = path.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if starts_ok && rest_ok {
        Ok(())
    } else {
        Err(ValidationError::new("path_segment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_folder(name: &str, path: &str) -> NewFolder {
        NewFolder {
            name: name.to_string(),
            path: path.to_string(),
            parent_id: FolderId::ROOT,
            visibility_level: VisibilityLevel::Private,
            description: String::new(),
        }
    }

    #[test]
    fn test_valid_new_folder() {
        assert!(new_folder("Payments Team", "payments-team").validate().is_ok());
        assert!(new_folder("a", "a.b_c-1").validate().is_ok());
    }

    #[test]
    fn test_path_must_be_single_segment() {
        assert!(new_folder("a", "a/b").validate().is_err());
        assert!(new_folder("a", "-a").validate().is_err());
        assert!(new_folder("a", "").validate().is_err());
    }

    #[test]
    fn test_name_cannot_contain_slash() {
        assert!(new_folder("a/b", "ab").validate().is_err());
        assert!(new_folder("   ", "ab").validate().is_err());
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!(
            "PUBLIC".parse::<VisibilityLevel>().unwrap(),
            VisibilityLevel::Public
        );
        assert!("secret".parse::<VisibilityLevel>().is_err());
    }
}
