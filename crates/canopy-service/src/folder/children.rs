//! Paged listing of a folder's direct children.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::{FolderId, PageRequest, PageResponse};
use canopy_database::{ChildRecord, FolderStore};
use canopy_entity::{Child, Folder, Full};

use super::full;

/// Merges subfolders and applications of one folder into [`Child`] nodes.
#[derive(Clone)]
pub struct ChildCompositor {
    folders: Arc<dyn FolderStore>,
}

impl ChildCompositor {
    /// Creates a new compositor.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// One page of the direct children of `parent` ([`FolderId::ROOT`] for
    /// the namespace root). Folder nodes carry their direct subfolder count.
    pub async fn list_children(
        &self,
        parent: FolderId,
        page: &PageRequest,
        include_applications: bool,
    ) -> AppResult<PageResponse<Child>> {
        let parent_full = self.scope_full(parent).await?;
        let records = self
            .folders
            .find_children(parent, page, include_applications)
            .await?;

        let folder_ids: Vec<FolderId> = records
            .items
            .iter()
            .filter_map(|record| match record {
                ChildRecord::Folder(f) => Some(f.id),
                ChildRecord::Application(_) => None,
            })
            .collect();
        let counts = self.subfolder_counts(&folder_ids).await?;

        debug!(
            parent_id = %parent,
            returned = records.items.len(),
            total = records.total_items,
            "Listed children"
        );

        let parent_full = parent_full.as_ref();
        Ok(records.map(|record| match record {
            ChildRecord::Folder(folder) => {
                let mut child =
                    Child::from_folder(&folder, full::join(parent_full, &folder.name, &folder.path));
                child.children_count = counts.get(&folder.id).copied().unwrap_or(0);
                child
            }
            ChildRecord::Application(application) => Child::from_application(
                &application,
                full::join(parent_full, &application.name, &application.name),
            ),
        }))
    }

    /// A single folder node with its identifiers and subfolder count.
    pub async fn get(&self, id: FolderId) -> AppResult<Child> {
        let folder = self.require(id).await?;
        let full = full::load_full(self.folders.as_ref(), &folder).await?;
        let counts = self.subfolder_counts(&[id]).await?;

        let mut child = Child::from_folder(&folder, full);
        child.children_count = counts.get(&id).copied().unwrap_or(0);
        Ok(child)
    }

    async fn require(&self, id: FolderId) -> AppResult<Folder> {
        self.folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn scope_full(&self, id: FolderId) -> AppResult<Option<Full>> {
        if id.is_root() {
            return Ok(None);
        }
        let folder = self.require(id).await?;
        full::load_full(self.folders.as_ref(), &folder).await.map(Some)
    }

    /// Direct subfolder counts for `ids`, from one batched lookup.
    async fn subfolder_counts(&self, ids: &[FolderId]) -> AppResult<HashMap<FolderId, usize>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut counts = HashMap::new();
        for sub in self.folders.find_subfolders_under(ids).await? {
            *counts.entry(sub.parent_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::error::ErrorKind;
    use canopy_entity::ChildKind;

    use crate::testing::{folder, scenario};

    #[tokio::test]
    async fn test_lists_folder_then_application() {
        let compositor = ChildCompositor::new(scenario().await);
        let page = compositor
            .list_children(FolderId(1), &PageRequest::default(), true)
            .await
            .unwrap();

        assert_eq!(page.total_items, 2);
        let b = &page.items[0];
        assert_eq!(b.kind(), ChildKind::Folder);
        assert_eq!(b.full_path, "/a/b");
        assert_eq!(b.children_count, 0);
        let app = &page.items[1];
        assert_eq!(app.kind(), ChildKind::Application);
        assert_eq!(app.full_path, "/a/app1");
    }

    #[tokio::test]
    async fn test_root_scope_counts_subfolders() {
        let store = scenario().await;
        store.insert_folder(folder(3, "C", "c", 1, "1,3")).await;
        let compositor = ChildCompositor::new(store);

        let page = compositor
            .list_children(FolderId::ROOT, &PageRequest::default(), true)
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].full_name, "/A");
        assert_eq!(page.items[0].children_count, 2);
    }

    #[tokio::test]
    async fn test_total_ignores_page_size() {
        let compositor = ChildCompositor::new(scenario().await);
        let page = compositor
            .list_children(FolderId(1), &PageRequest::new(1, 1), true)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_items, 2);
    }

    #[tokio::test]
    async fn test_subfolders_only() {
        let compositor = ChildCompositor::new(scenario().await);
        let page = compositor
            .list_children(FolderId(1), &PageRequest::default(), false)
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, 2);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let compositor = ChildCompositor::new(scenario().await);
        let err = compositor
            .list_children(FolderId(99), &PageRequest::default(), true)
            .await
            .expect_err("missing parent");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let compositor = ChildCompositor::new(scenario().await);
        let a = compositor.get(FolderId(1)).await.unwrap();
        assert_eq!(a.full_path, "/a");
        assert_eq!(a.children_count, 1);
        let b = compositor.get(FolderId(2)).await.unwrap();
        assert_eq!(b.full_name, "/A/B");
        assert!(compositor.get(FolderId(7)).await.is_err());
    }
}
