//! Fuzzy search that rebuilds the ancestor tree around each match.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use canopy_core::result::AppResult;
use canopy_core::types::{FolderId, PageRequest, PageResponse};
use canopy_database::{ApplicationStore, FolderStore};
use canopy_entity::{Child, Folder, Full, TraversalIds};

use super::children::ChildCompositor;
use super::full;

/// Parameters of a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Folder the search is limited to; [`FolderId::ROOT`] searches everything.
    #[serde(default)]
    pub scope: FolderId,
    /// Case-insensitive name fragment. Empty lists the scope's children.
    #[serde(default)]
    pub filter: String,
    /// Paging, only applied when the filter is empty.
    #[serde(default)]
    pub page: PageRequest,
    /// Whether applications are matched too.
    #[serde(default)]
    pub include_applications: bool,
}

/// Matches folders (and optionally applications) by name and returns them
/// nested under their ancestors.
#[derive(Clone)]
pub struct SearchEngine {
    folders: Arc<dyn FolderStore>,
    applications: Arc<dyn ApplicationStore>,
    compositor: ChildCompositor,
}

impl SearchEngine {
    /// Creates a new search engine.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        applications: Arc<dyn ApplicationStore>,
        compositor: ChildCompositor,
    ) -> Self {
        Self {
            folders,
            applications,
            compositor,
        }
    }

    /// Run a search.
    ///
    /// The result holds the scope's first-level nodes, most recently updated
    /// first, each carrying the matched part of its subtree in `children`.
    /// `total_items` is the number of first-level nodes.
    pub async fn search(&self, params: &SearchParams) -> AppResult<PageResponse<Child>> {
        let filter = params.filter.as_str();
        if filter.is_empty() {
            return self
                .compositor
                .list_children(params.scope, &params.page, params.include_applications)
                .await;
        }

        let matched = if params.scope.is_root() {
            self.folders.find_by_name_fuzzy(filter).await?
        } else {
            self.folders
                .find_by_name_fuzzy_under(params.scope, filter)
                .await?
        };
        let applications = if params.include_applications {
            self.applications.find_by_name_fuzzy(filter).await?
        } else {
            Vec::new()
        };

        let mut wanted: BTreeSet<FolderId> = BTreeSet::new();
        for folder in &matched {
            wanted.extend(folder.traversal()?.ids());
        }
        let owner_ids: Vec<FolderId> = applications
            .iter()
            .map(|a| a.group_id)
            .filter(|id| !wanted.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !owner_ids.is_empty() {
            for owner in self.folders.find_by_ids(&owner_ids).await? {
                wanted.extend(owner.traversal()?.ids());
            }
        }

        if wanted.is_empty() {
            debug!(filter = %filter, "Search matched nothing");
            return Ok(PageResponse::new(
                Vec::new(),
                params.page.page,
                params.page.page_size,
                0,
            ));
        }

        let wanted: Vec<FolderId> = wanted.into_iter().collect();
        let expanded: HashMap<FolderId, Folder> = self
            .folders
            .find_by_ids(&wanted)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let mut fulls: HashMap<FolderId, Full> = HashMap::with_capacity(expanded.len());
        let mut chains: HashMap<FolderId, TraversalIds> = HashMap::with_capacity(expanded.len());
        for folder in expanded.values() {
            fulls.insert(folder.id, full::full_of(folder, &expanded)?);
            chains.insert(folder.id, folder.traversal()?);
        }

        let mut collected: HashMap<FolderId, Vec<Child>> = HashMap::new();
        for application in &applications {
            let Some(owner_full) = fulls.get(&application.group_id) else {
                warn!(
                    application_id = %application.id,
                    group_id = %application.group_id,
                    "Skipping application whose folder does not exist"
                );
                continue;
            };
            let app_full = full::join(Some(owner_full), &application.name, &application.name);
            collected
                .entry(application.group_id)
                .or_default()
                .push(Child::from_application(application, app_full));
        }

        // Deepest first, so every folder is complete before it is attached.
        let mut order: Vec<(usize, FolderId)> = chains
            .iter()
            .filter(|(id, chain)| {
                params.scope.is_root() || (**id != params.scope && chain.contains(params.scope))
            })
            .map(|(id, chain)| (chain.depth(), *id))
            .collect();
        order.sort_unstable_by(|a, b| b.cmp(a));

        for (_, id) in order {
            let (Some(folder), Some(full)) = (expanded.get(&id), fulls.get(&id)) else {
                continue;
            };
            let mut children = collected.remove(&id).unwrap_or_default();
            children.sort_by(Child::cmp_kind);
            let node = Child::from_folder(folder, full.clone()).with_children(children);
            collected.entry(folder.parent_id).or_default().push(node);
        }

        let mut top = collected.remove(&params.scope).unwrap_or_default();
        top.sort_by(Child::cmp_recency);

        debug!(
            filter = %filter,
            scope = %params.scope,
            matched_folders = matched.len(),
            matched_applications = applications.len(),
            top_level = top.len(),
            "Search completed"
        );

        let total = top.len() as u64;
        Ok(PageResponse::new(
            top,
            params.page.page,
            params.page.page_size,
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_entity::ChildKind;

    use crate::testing::{application, folder, scenario};

    fn engine(store: Arc<canopy_database::MemoryStore>) -> SearchEngine {
        let compositor = ChildCompositor::new(store.clone());
        SearchEngine::new(store.clone(), store, compositor)
    }

    fn params(scope: i64, filter: &str, include_applications: bool) -> SearchParams {
        SearchParams {
            scope: FolderId(scope),
            filter: filter.to_string(),
            page: PageRequest::default(),
            include_applications,
        }
    }

    #[tokio::test]
    async fn test_application_match_nests_under_folder() {
        let result = engine(scenario().await)
            .search(&params(0, "app", true))
            .await
            .unwrap();

        assert_eq!(result.total_items, 1);
        let a = &result.items[0];
        assert_eq!(a.id, 1);
        assert_eq!(a.children_count, 1);
        let children = a.children.as_ref().expect("nested children");
        assert_eq!(children[0].kind(), ChildKind::Application);
        assert_eq!(children[0].full_path, "/a/app1");
    }

    #[tokio::test]
    async fn test_folder_match_keeps_ancestors() {
        let result = engine(scenario().await)
            .search(&params(0, "b", true))
            .await
            .unwrap();

        assert_eq!(result.total_items, 1);
        let a = &result.items[0];
        assert_eq!(a.full_path, "/a");
        let b = &a.children.as_ref().unwrap()[0];
        assert_eq!(b.full_path, "/a/b");
        assert_eq!(b.children_count, 0);
    }

    #[tokio::test]
    async fn test_folders_sort_before_applications() {
        let store = scenario().await;
        store.insert_folder(folder(3, "apple", "apple", 1, "1,3")).await;
        let result = engine(store).search(&params(0, "ap", true)).await.unwrap();

        let kinds: Vec<ChildKind> = result.items[0]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(Child::kind)
            .collect();
        assert_eq!(kinds, vec![ChildKind::Folder, ChildKind::Application]);
    }

    #[tokio::test]
    async fn test_top_level_is_most_recent_first() {
        let store = scenario().await;
        store.insert_folder(folder(5, "Beta", "beta", 0, "5")).await;
        let result = engine(store).search(&params(0, "b", false)).await.unwrap();

        assert_eq!(result.total_items, 2);
        assert!(result.items[0].updated_at >= result.items[1].updated_at);
        assert_eq!(result.items[0].id, 5);
    }

    #[tokio::test]
    async fn test_scoped_search_returns_scope_children() {
        let store = scenario().await;
        store.insert_folder(folder(3, "Bx", "bx", 2, "1,2,3")).await;
        store.insert_folder(folder(4, "Bz", "bz", 0, "4")).await;
        let result = engine(store).search(&params(1, "b", false)).await.unwrap();

        assert_eq!(result.total_items, 1);
        let b = &result.items[0];
        assert_eq!(b.id, 2);
        assert_eq!(b.children.as_ref().unwrap()[0].id, 3);
    }

    #[tokio::test]
    async fn test_case_insensitive() {
        let result = engine(scenario().await)
            .search(&params(0, "APP", true))
            .await
            .unwrap();
        assert_eq!(result.total_items, 1);
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let result = engine(scenario().await)
            .search(&params(0, "zzz", true))
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_items, 0);
    }

    #[tokio::test]
    async fn test_empty_filter_lists_children() {
        let result = engine(scenario().await)
            .search(&params(1, "", true))
            .await
            .unwrap();
        assert_eq!(result.total_items, 2);
        assert!(result.items.iter().all(|c| c.children.is_none()));
    }

    #[tokio::test]
    async fn test_whitespace_filter_is_matched_literally() {
        let store = scenario().await;
        store.insert_folder(folder(3, "My Team", "my-team", 0, "3")).await;
        let result = engine(store).search(&params(0, " ", true)).await.unwrap();

        let found: Vec<(i64, bool)> = result
            .items
            .iter()
            .map(|c| (c.id, c.children.as_ref().is_some_and(|v| !v.is_empty())))
            .collect();
        assert_eq!(found, vec![(3, false)]);
    }

    #[tokio::test]
    async fn test_orphan_application_is_skipped() {
        let store = scenario().await;
        store.insert_application(application(11, "app-orphan", 42, 9)).await;
        let result = engine(store).search(&params(0, "app", true)).await.unwrap();
        assert_eq!(result.total_items, 1);
        assert_eq!(result.items[0].id, 1);
    }
}
