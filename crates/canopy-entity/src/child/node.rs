//! The unified `Child` node.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use canopy_core::types::{ApplicationId, FolderId};

use crate::application::Application;
use crate::cluster::Cluster;
use crate::folder::{Folder, VisibilityLevel};

/// Full identifiers of a resource: its ancestors' names and path segments
/// joined with `/`, each anchored with a leading `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Full {
    /// e.g. `/Payments/Gateway`.
    pub full_name: String,
    /// e.g. `/payments/gateway`.
    pub full_path: String,
}

impl Full {
    /// Create a new pair.
    pub fn new(full_name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            full_path: full_path.into(),
        }
    }
}

/// Discriminant of a [`Child`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildKind {
    /// A folder (group).
    Folder,
    /// An application.
    Application,
    /// A cluster.
    Cluster,
}

impl ChildKind {
    /// Sibling rank: folders first, then applications, then clusters.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Folder => 0,
            Self::Application => 1,
            Self::Cluster => 2,
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Application => "application",
            Self::Cluster => "cluster",
        }
    }
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind-specific fields of a [`Child`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildDetail {
    /// A folder.
    Folder {
        /// Parent folder.
        parent_id: FolderId,
        /// Visibility of the folder.
        visibility_level: VisibilityLevel,
        /// Free-form description.
        description: String,
    },
    /// An application.
    Application {
        /// Owning folder.
        group_id: FolderId,
    },
    /// A cluster.
    Cluster {
        /// Owning application.
        application_id: ApplicationId,
    },
}

/// A folder, application, or cluster with its computed identifiers.
///
/// Built fresh for every request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    /// Raw id of the underlying resource. Ids are only unique per kind.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Path segment.
    pub path: String,
    /// Slash-joined ancestor names, ending with this node's name.
    pub full_name: String,
    /// Slash-joined ancestor path segments, ending with this node's path.
    pub full_path: String,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub detail: ChildDetail,
    /// Number of direct children.
    pub children_count: usize,
    /// Nested children; only populated by search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Child>>,
    /// When the underlying resource was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Child {
    /// A folder node.
    pub fn from_folder(folder: &Folder, full: Full) -> Self {
        Self {
            id: folder.id.get(),
            name: folder.name.clone(),
            path: folder.path.clone(),
            full_name: full.full_name,
            full_path: full.full_path,
            detail: ChildDetail::Folder {
                parent_id: folder.parent_id,
                visibility_level: folder.visibility_level,
                description: folder.description.clone(),
            },
            children_count: 0,
            children: None,
            updated_at: folder.updated_at,
        }
    }

    /// An application node. Applications use their name as path segment.
    pub fn from_application(application: &Application, full: Full) -> Self {
        Self {
            id: application.id.get(),
            name: application.name.clone(),
            path: application.name.clone(),
            full_name: full.full_name,
            full_path: full.full_path,
            detail: ChildDetail::Application {
                group_id: application.group_id,
            },
            children_count: 0,
            children: None,
            updated_at: application.updated_at,
        }
    }

    /// A cluster node. Clusters use their name as path segment.
    pub fn from_cluster(cluster: &Cluster, full: Full) -> Self {
        Self {
            id: cluster.id.get(),
            name: cluster.name.clone(),
            path: cluster.name.clone(),
            full_name: full.full_name,
            full_path: full.full_path,
            detail: ChildDetail::Cluster {
                application_id: cluster.application_id,
            },
            children_count: 0,
            children: None,
            updated_at: cluster.updated_at,
        }
    }

    /// The node's kind.
    pub fn kind(&self) -> ChildKind {
        match self.detail {
            ChildDetail::Folder { .. } => ChildKind::Folder,
            ChildDetail::Application { .. } => ChildKind::Application,
            ChildDetail::Cluster { .. } => ChildKind::Cluster,
        }
    }

    /// Attach nested children, setting the count to match.
    pub fn with_children(mut self, children: Vec<Child>) -> Self {
        self.children_count = children.len();
        self.children = Some(children);
        self
    }

    /// Sibling order: by kind rank only, so a stable sort keeps the
    /// collection order within a kind.
    pub fn cmp_kind(a: &Child, b: &Child) -> Ordering {
        a.kind().rank().cmp(&b.kind().rank())
    }

    /// Top-level order: most recently updated first.
    pub fn cmp_recency(a: &Child, b: &Child) -> Ordering {
        b.updated_at.cmp(&a.updated_at)
    }
}
