//! Flat folder view with full identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use canopy_core::types::FolderId;

use super::node::Full;
use crate::folder::{Folder, VisibilityLevel};

/// A folder row enriched with its full name and path, as returned by the
/// authorized folder listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderView {
    /// Folder ID.
    pub id: FolderId,
    /// Display name.
    pub name: String,
    /// Path segment.
    pub path: String,
    /// Visibility of the folder.
    pub visibility_level: VisibilityLevel,
    /// Free-form description.
    pub description: String,
    /// Parent folder ID.
    pub parent_id: FolderId,
    /// Serialized ancestor chain.
    pub traversal_ids: String,
    /// Slash-joined ancestor names.
    pub full_name: String,
    /// Slash-joined ancestor path segments.
    pub full_path: String,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FolderView {
    /// Combine a folder row with its computed identifiers.
    pub fn new(folder: &Folder, full: Full) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            path: folder.path.clone(),
            visibility_level: folder.visibility_level,
            description: folder.description.clone(),
            parent_id: folder.parent_id,
            traversal_ids: folder.traversal_ids.clone(),
            full_name: full.full_name,
            full_path: full.full_path,
            updated_at: folder.updated_at,
        }
    }
}
