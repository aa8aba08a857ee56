//! In-memory implementation of every store contract.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::{
    ApplicationId, ClusterId, FolderId, PageRequest, PageResponse, UserId,
};
use canopy_entity::{
    Application, Cluster, Folder, NewFolder, ResourceType, Role, TraversalIds, UpdateFolder,
};

use crate::store::{
    ApplicationStore, ChildRecord, ClusterStore, FolderStore, FolderTransaction,
    MembershipProvider,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    folders: BTreeMap<FolderId, Folder>,
    applications: BTreeMap<ApplicationId, Application>,
    clusters: BTreeMap<ClusterId, Cluster>,
    members: HashMap<(UserId, ResourceType, i64), Role>,
    last_folder_id: i64,
    last_application_id: i64,
    last_cluster_id: i64,
}

impl MemoryState {
    /// Mirror of the `(parent_id, name)` / `(parent_id, path)` unique keys.
    fn check_sibling_keys(
        &self,
        parent: FolderId,
        name: &str,
        path: &str,
        except: Option<FolderId>,
    ) -> AppResult<()> {
        for sibling in self.folders.values() {
            if sibling.parent_id != parent || Some(sibling.id) == except {
                continue;
            }
            if sibling.name == name {
                return Err(AppError::validation(format!(
                    "A sibling folder named '{name}' already exists"
                )));
            }
            if sibling.path == path {
                return Err(AppError::validation(format!(
                    "A sibling folder with path '{path}' already exists"
                )));
            }
        }
        Ok(())
    }
}

fn name_matches(name: &str, filter: &str) -> bool {
    name.to_lowercase().contains(&filter.to_lowercase())
}

/// Process-local store holding folders, applications, clusters, and
/// memberships behind one async mutex.
///
/// Transactions take the mutex for their whole lifetime and work on a staged
/// copy that replaces the live state on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a folder row verbatim, bypassing chain maintenance.
    pub async fn insert_folder(&self, folder: Folder) {
        let mut state = self.state.lock().await;
        state.last_folder_id = state.last_folder_id.max(folder.id.get());
        state.folders.insert(folder.id, folder);
    }

    /// Add an application owned by `group_id`.
    pub async fn add_application(&self, name: &str, group_id: FolderId) -> Application {
        let mut state = self.state.lock().await;
        state.last_application_id += 1;
        let now = Utc::now();
        let application = Application {
            id: ApplicationId(state.last_application_id),
            name: name.to_string(),
            group_id,
            created_at: now,
            updated_at: now,
        };
        state
            .applications
            .insert(application.id, application.clone());
        application
    }

    /// Insert an application row verbatim.
    pub async fn insert_application(&self, application: Application) {
        let mut state = self.state.lock().await;
        state.last_application_id = state.last_application_id.max(application.id.get());
        state.applications.insert(application.id, application);
    }

    /// Add a cluster of `application_id`.
    pub async fn add_cluster(&self, name: &str, application_id: ApplicationId) -> Cluster {
        let mut state = self.state.lock().await;
        state.last_cluster_id += 1;
        let now = Utc::now();
        let cluster = Cluster {
            id: ClusterId(state.last_cluster_id),
            name: name.to_string(),
            application_id,
            created_at: now,
            updated_at: now,
        };
        state.clusters.insert(cluster.id, cluster.clone());
        cluster
    }

    /// Insert a cluster row verbatim.
    pub async fn insert_cluster(&self, cluster: Cluster) {
        let mut state = self.state.lock().await;
        state.last_cluster_id = state.last_cluster_id.max(cluster.id.get());
        state.clusters.insert(cluster.id, cluster);
    }

    /// Grant `user` a role on a resource.
    pub async fn grant(&self, user: UserId, resource_type: ResourceType, resource_id: i64, role: Role) {
        self.state
            .lock()
            .await
            .members
            .insert((user, resource_type, resource_id), role);
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.state.lock().await.folders.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[FolderId]) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        Ok(state
            .folders
            .values()
            .filter(|f| ids.contains(&f.id))
            .cloned()
            .collect())
    }

    async fn find_by_path_segments(&self, segments: &[String]) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        Ok(state
            .folders
            .values()
            .filter(|f| segments.iter().any(|s| *s == f.path))
            .cloned()
            .collect())
    }

    async fn find_by_name_fuzzy(&self, filter: &str) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        Ok(state
            .folders
            .values()
            .filter(|f| name_matches(&f.name, filter))
            .cloned()
            .collect())
    }

    async fn find_by_name_fuzzy_under(
        &self,
        scope: FolderId,
        filter: &str,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        Ok(state
            .folders
            .values()
            .filter(|f| f.id != scope && name_matches(&f.name, filter))
            .filter(|f| f.traversal().is_ok_and(|chain| chain.contains(scope)))
            .cloned()
            .collect())
    }

    async fn find_children(
        &self,
        parent: FolderId,
        page: &PageRequest,
        include_applications: bool,
    ) -> AppResult<PageResponse<ChildRecord>> {
        let state = self.state.lock().await;

        let mut folders: Vec<&Folder> = state
            .folders
            .values()
            .filter(|f| f.parent_id == parent)
            .collect();
        folders.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        let mut records: Vec<ChildRecord> = folders
            .into_iter()
            .cloned()
            .map(ChildRecord::Folder)
            .collect();

        if include_applications {
            let mut applications: Vec<&Application> = state
                .applications
                .values()
                .filter(|a| a.group_id == parent)
                .collect();
            applications.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
            records.extend(applications.into_iter().cloned().map(ChildRecord::Application));
        }

        Ok(page.slice(records))
    }

    async fn find_subfolders_under(&self, parent_ids: &[FolderId]) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        Ok(state
            .folders
            .values()
            .filter(|f| parent_ids.contains(&f.parent_id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Folder>> {
        Ok(self.state.lock().await.folders.values().cloned().collect())
    }

    async fn begin(&self) -> AppResult<Box<dyn FolderTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        debug!("Began in-memory folder transaction");
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }
}

/// Exclusive, staged view of a [`MemoryStore`].
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl FolderTransaction for MemoryTransaction {
    async fn find_by_id(&mut self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.staged.folders.get(&id).cloned())
    }

    async fn find_siblings(&mut self, parent: FolderId) -> AppResult<Vec<Folder>> {
        Ok(self
            .staged
            .folders
            .values()
            .filter(|f| f.parent_id == parent)
            .cloned()
            .collect())
    }

    async fn count_subfolders(&mut self, id: FolderId) -> AppResult<u64> {
        Ok(self
            .staged
            .folders
            .values()
            .filter(|f| f.parent_id == id)
            .count() as u64)
    }

    async fn find_descendants(&mut self, chain: &TraversalIds) -> AppResult<Vec<Folder>> {
        Ok(self
            .staged
            .folders
            .values()
            .filter(|f| {
                f.traversal()
                    .is_ok_and(|own| own.len() > chain.len() && own.starts_with(chain))
            })
            .cloned()
            .collect())
    }

    async fn insert(&mut self, folder: &NewFolder, actor: UserId) -> AppResult<Folder> {
        self.staged
            .check_sibling_keys(folder.parent_id, &folder.name, &folder.path, None)?;
        self.staged.last_folder_id += 1;
        let now = Utc::now();
        let row = Folder {
            id: FolderId(self.staged.last_folder_id),
            name: folder.name.clone(),
            path: folder.path.clone(),
            description: folder.description.clone(),
            visibility_level: folder.visibility_level,
            parent_id: folder.parent_id,
            traversal_ids: String::new(),
            created_by: actor,
            updated_by: actor,
            created_at: now,
            updated_at: now,
        };
        self.staged.folders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_traversal(&mut self, id: FolderId, chain: &TraversalIds) -> AppResult<()> {
        if let Some(folder) = self.staged.folders.get_mut(&id) {
            folder.traversal_ids = chain.encode();
        }
        Ok(())
    }

    async fn update_parent(
        &mut self,
        id: FolderId,
        parent: FolderId,
        chain: &TraversalIds,
        actor: UserId,
    ) -> AppResult<()> {
        if let Some(folder) = self.staged.folders.get_mut(&id) {
            folder.parent_id = parent;
            folder.traversal_ids = chain.encode();
            folder.updated_by = actor;
            folder.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_basic(
        &mut self,
        id: FolderId,
        fields: &UpdateFolder,
        actor: UserId,
    ) -> AppResult<u64> {
        let Some(parent) = self.staged.folders.get(&id).map(|f| f.parent_id) else {
            return Ok(0);
        };
        self.staged
            .check_sibling_keys(parent, &fields.name, &fields.path, Some(id))?;
        if let Some(folder) = self.staged.folders.get_mut(&id) {
            folder.name = fields.name.clone();
            folder.path = fields.path.clone();
            folder.description = fields.description.clone();
            folder.visibility_level = fields.visibility_level;
            folder.updated_by = actor;
            folder.updated_at = Utc::now();
        }
        Ok(1)
    }

    async fn delete(&mut self, id: FolderId) -> AppResult<u64> {
        Ok(u64::from(self.staged.folders.remove(&id).is_some()))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        debug!("Committed in-memory folder transaction");
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn find_by_id(&self, id: ApplicationId) -> AppResult<Option<Application>> {
        Ok(self.state.lock().await.applications.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Application>> {
        let state = self.state.lock().await;
        Ok(state.applications.values().find(|a| a.name == name).cloned())
    }

    async fn find_by_name_fuzzy(&self, filter: &str) -> AppResult<Vec<Application>> {
        let state = self.state.lock().await;
        Ok(state
            .applications
            .values()
            .filter(|a| name_matches(&a.name, filter))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClusterStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Cluster>> {
        let state = self.state.lock().await;
        Ok(state.clusters.values().find(|c| c.name == name).cloned())
    }
}

#[async_trait]
impl MembershipProvider for MemoryStore {
    async fn get_role(
        &self,
        user: UserId,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> AppResult<Option<Role>> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .get(&(user, resource_type, resource_id))
            .copied())
    }
}
