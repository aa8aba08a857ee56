//! Path resolution: folder, then application, then cluster.

use std::sync::Arc;

use tracing::debug;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_database::{ApplicationStore, ClusterStore, FolderStore};
use canopy_entity::Child;

use super::full;

/// Resolves a slash-delimited path to the folder, application, or cluster
/// it names.
#[derive(Clone)]
pub struct PathResolver {
    folders: Arc<dyn FolderStore>,
    applications: Arc<dyn ApplicationStore>,
    clusters: Arc<dyn ClusterStore>,
}

impl PathResolver {
    /// Creates a new resolver.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        applications: Arc<dyn ApplicationStore>,
        clusters: Arc<dyn ClusterStore>,
    ) -> Self {
        Self {
            folders,
            applications,
            clusters,
        }
    }

    /// Resolve `path` (leading `/` optional) to exactly one node.
    ///
    /// Applications and clusters use their name as path segment. A path that
    /// names nothing yields a single `NotFound`.
    pub async fn resolve(&self, path: &str) -> AppResult<Child> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Err(AppError::not_found("Empty path"));
        }
        let target = format!("/{trimmed}");
        let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();

        let candidates = self.folders.find_by_path_segments(&segments).await?;
        let fulls = full::index(&candidates);

        if let Some(folder) = candidates
            .iter()
            .find(|f| fulls.get(&f.id).is_some_and(|full| full.full_path == target))
        {
            debug!(folder_id = %folder.id, path = %target, "Path resolved to folder");
            return Ok(Child::from_folder(folder, fulls[&folder.id].clone()));
        }

        let Some(last) = segments.last() else {
            return Err(not_found(&target));
        };

        if segments.len() >= 2 {
            if let Some(application) = self.applications.find_by_name(last).await? {
                if let Some(owner) = fulls.get(&application.group_id) {
                    let app_full = full::join(Some(owner), &application.name, &application.name);
                    if app_full.full_path == target {
                        debug!(application_id = %application.id, path = %target, "Path resolved to application");
                        return Ok(Child::from_application(&application, app_full));
                    }
                }
            }
        }

        if segments.len() >= 3 {
            if let Some(cluster) = self.clusters.find_by_name(last).await? {
                if let Some(application) =
                    self.applications.find_by_id(cluster.application_id).await?
                {
                    if let Some(owner) = fulls.get(&application.group_id) {
                        let app_full =
                            full::join(Some(owner), &application.name, &application.name);
                        let cluster_full =
                            full::join(Some(&app_full), &cluster.name, &cluster.name);
                        if cluster_full.full_path == target {
                            debug!(cluster_id = %cluster.id, path = %target, "Path resolved to cluster");
                            return Ok(Child::from_cluster(&cluster, cluster_full));
                        }
                    }
                }
            }
        }

        Err(not_found(&target))
    }
}

fn not_found(path: &str) -> AppError {
    AppError::not_found(format!("Nothing found at path '{path}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::error::ErrorKind;
    use canopy_entity::ChildKind;

    use crate::testing::{folder, scenario};

    async fn resolver() -> PathResolver {
        let store = scenario().await;
        PathResolver::new(store.clone(), store.clone(), store)
    }

    #[tokio::test]
    async fn test_resolves_folder() {
        let child = resolver().await.resolve("/a/b").await.unwrap();
        assert_eq!(child.kind(), ChildKind::Folder);
        assert_eq!(child.id, 2);
        assert_eq!(child.full_name, "/A/B");
    }

    #[tokio::test]
    async fn test_leading_slash_is_optional() {
        let child = resolver().await.resolve("a").await.unwrap();
        assert_eq!(child.id, 1);
        assert_eq!(child.full_path, "/a");
    }

    #[tokio::test]
    async fn test_resolves_application() {
        let child = resolver().await.resolve("/a/app1").await.unwrap();
        assert_eq!(child.kind(), ChildKind::Application);
        assert_eq!(child.id, 10);
        assert_eq!(child.full_path, "/a/app1");
    }

    #[tokio::test]
    async fn test_resolves_cluster() {
        let child = resolver().await.resolve("/a/app1/c1").await.unwrap();
        assert_eq!(child.kind(), ChildKind::Cluster);
        assert_eq!(child.id, 100);
        assert_eq!(child.full_name, "/A/app1/c1");
    }

    #[tokio::test]
    async fn test_misses_are_not_found() {
        let resolver = resolver().await;
        for path in ["", "/", "/b", "/a/b/app1", "/a/nope", "/x/app1", "/a/b/c1"] {
            let err = resolver.resolve(path).await.expect_err(path);
            assert_eq!(err.kind, ErrorKind::NotFound, "{path}");
        }
    }

    #[tokio::test]
    async fn test_same_segment_under_other_parent() {
        let store = scenario().await;
        store.insert_folder(folder(3, "C", "c", 0, "3")).await;
        store.insert_folder(folder(4, "B2", "b", 3, "3,4")).await;
        let resolver = PathResolver::new(store.clone(), store.clone(), store);

        assert_eq!(resolver.resolve("/c/b").await.unwrap().id, 4);
        assert_eq!(resolver.resolve("/a/b").await.unwrap().id, 2);
    }
}
