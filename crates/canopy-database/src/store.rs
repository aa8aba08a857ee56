//! Store contracts the tree engine depends on.
//!
//! Each surface is a trait object so services receive their stores through
//! constructors (`Arc<dyn FolderStore>`) and tests can swap in
//! [`crate::MemoryStore`]. Lookups that find nothing return `Ok(None)` or an
//! empty vector; only genuine persistence failures are errors.

use async_trait::async_trait;

use canopy_core::result::AppResult;
use canopy_core::types::{ApplicationId, FolderId, PageRequest, PageResponse, UserId};
use canopy_entity::{
    Application, Cluster, Folder, NewFolder, ResourceType, Role, TraversalIds, UpdateFolder,
};

/// One row of a mixed folder/application child listing.
#[derive(Debug, Clone)]
pub enum ChildRecord {
    /// A subfolder.
    Folder(Folder),
    /// An application owned by the listed folder.
    Application(Application),
}

/// Read access to folders, plus the entry point for mutations.
#[async_trait]
pub trait FolderStore: Send + Sync + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Find folders by IDs, ordered by ID. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[FolderId]) -> AppResult<Vec<Folder>>;

    /// Find every folder whose path segment equals one of `segments`.
    async fn find_by_path_segments(&self, segments: &[String]) -> AppResult<Vec<Folder>>;

    /// Find folders whose name contains `filter`, ignoring case.
    async fn find_by_name_fuzzy(&self, filter: &str) -> AppResult<Vec<Folder>>;

    /// Like [`FolderStore::find_by_name_fuzzy`], restricted to strict
    /// descendants of `scope`.
    async fn find_by_name_fuzzy_under(
        &self,
        scope: FolderId,
        filter: &str,
    ) -> AppResult<Vec<Folder>>;

    /// One page of the direct children of `parent` (the root when
    /// [`FolderId::ROOT`]). Folders come before applications; within a kind
    /// the most recently updated come first. `total_items` counts every
    /// child, not just the page.
    async fn find_children(
        &self,
        parent: FolderId,
        page: &PageRequest,
        include_applications: bool,
    ) -> AppResult<PageResponse<ChildRecord>>;

    /// All direct subfolders of any folder in `parent_ids`.
    async fn find_subfolders_under(&self, parent_ids: &[FolderId]) -> AppResult<Vec<Folder>>;

    /// Every folder, ordered by ID.
    async fn find_all(&self) -> AppResult<Vec<Folder>>;

    /// Start a transaction. Dropping it without commit rolls back.
    async fn begin(&self) -> AppResult<Box<dyn FolderTransaction>>;
}

/// A unit of folder mutations that commits or rolls back atomically.
#[async_trait]
pub trait FolderTransaction: Send {
    /// Find (and lock) a folder by ID.
    async fn find_by_id(&mut self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Direct subfolders of `parent`.
    async fn find_siblings(&mut self, parent: FolderId) -> AppResult<Vec<Folder>>;

    /// Number of direct subfolders of `id`.
    async fn count_subfolders(&mut self, id: FolderId) -> AppResult<u64>;

    /// Every folder whose chain strictly extends `chain`.
    async fn find_descendants(&mut self, chain: &TraversalIds) -> AppResult<Vec<Folder>>;

    /// Insert a folder row. The returned row has an empty chain until
    /// [`FolderTransaction::update_traversal`] is called.
    async fn insert(&mut self, folder: &NewFolder, actor: UserId) -> AppResult<Folder>;

    /// Overwrite a folder's chain.
    async fn update_traversal(&mut self, id: FolderId, chain: &TraversalIds) -> AppResult<()>;

    /// Move a folder under `parent` with its new chain.
    async fn update_parent(
        &mut self,
        id: FolderId,
        parent: FolderId,
        chain: &TraversalIds,
        actor: UserId,
    ) -> AppResult<()>;

    /// Overwrite name, path, description, and visibility. Returns rows
    /// affected.
    async fn update_basic(
        &mut self,
        id: FolderId,
        fields: &UpdateFolder,
        actor: UserId,
    ) -> AppResult<u64>;

    /// Delete a folder row. Returns rows affected.
    async fn delete(&mut self, id: FolderId) -> AppResult<u64>;

    /// Make every change visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Read access to applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync + 'static {
    /// Find an application by ID.
    async fn find_by_id(&self, id: ApplicationId) -> AppResult<Option<Application>>;

    /// Find an application by its exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Application>>;

    /// Find applications whose name contains `filter`, ignoring case.
    async fn find_by_name_fuzzy(&self, filter: &str) -> AppResult<Vec<Application>>;
}

/// Read access to clusters.
#[async_trait]
pub trait ClusterStore: Send + Sync + 'static {
    /// Find a cluster by its exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Cluster>>;
}

/// The membership service consulted for authorization filtering.
#[async_trait]
pub trait MembershipProvider: Send + Sync + 'static {
    /// The role `user` holds on a resource, if any.
    async fn get_role(
        &self,
        user: UserId,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> AppResult<Option<Role>>;
}
