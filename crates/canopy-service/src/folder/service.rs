//! Folder tree facade: every read and write of the namespace goes through here.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, instrument, warn};

use canopy_core::config::ServiceConfig;
use canopy_core::error::{AppError, ErrorKind};
use canopy_core::result::{AppResult, OperationExt};
use canopy_core::types::{FolderId, PageRequest, PageResponse};
use canopy_database::{ApplicationStore, ClusterStore, FolderStore, MembershipProvider};
use canopy_entity::{Child, FolderView, NewFolder, UpdateFolder};

use super::authz::AuthorizationFilter;
use super::children::ChildCompositor;
use super::full;
use super::mutator::TreeMutator;
use super::resolver::PathResolver;
use super::search::{SearchEngine, SearchParams};
use crate::context::RequestContext;

/// Lists, resolves, searches, and mutates the folder tree.
#[derive(Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    compositor: ChildCompositor,
    resolver: PathResolver,
    search: SearchEngine,
    mutator: TreeMutator,
    authz: AuthorizationFilter,
    config: ServiceConfig,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        applications: Arc<dyn ApplicationStore>,
        clusters: Arc<dyn ClusterStore>,
        membership: Arc<dyn MembershipProvider>,
        config: ServiceConfig,
    ) -> Self {
        let compositor = ChildCompositor::new(Arc::clone(&folders));
        Self {
            resolver: PathResolver::new(
                Arc::clone(&folders),
                Arc::clone(&applications),
                clusters,
            ),
            search: SearchEngine::new(Arc::clone(&folders), applications, compositor.clone()),
            mutator: TreeMutator::new(Arc::clone(&folders)),
            authz: AuthorizationFilter::new(membership, config.membership_concurrency),
            compositor,
            folders,
            config,
        }
    }

    /// Page request with the configured default size when none is given.
    pub fn page_request(&self, page: u64, page_size: Option<u64>) -> PageRequest {
        PageRequest::new(page, page_size.unwrap_or(self.config.default_page_size))
    }

    /// Direct children of a folder (subfolders, then applications).
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        page: PageRequest,
        include_applications: bool,
    ) -> AppResult<PageResponse<Child>> {
        self.run(ctx, "folder service: list children", async {
            self.compositor
                .list_children(folder_id, &page, include_applications)
                .await
        })
        .await
    }

    /// Direct subfolders of a folder.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list_subfolders(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Child>> {
        self.run(ctx, "folder service: list subfolders", async {
            self.compositor.list_children(folder_id, &page, false).await
        })
        .await
    }

    /// A single folder.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: FolderId) -> AppResult<Child> {
        self.run(ctx, "folder service: get", self.compositor.get(id))
            .await
    }

    /// The folder, application, or cluster at `path`.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn resolve(&self, ctx: &RequestContext, path: &str) -> AppResult<Child> {
        self.run(ctx, "folder service: resolve", self.resolver.resolve(path))
            .await
    }

    /// Fuzzy search within a scope.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn search(
        &self,
        ctx: &RequestContext,
        params: &SearchParams,
    ) -> AppResult<PageResponse<Child>> {
        self.run(ctx, "folder service: search", self.search.search(params))
            .await
    }

    /// Fuzzy search over folders only.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn search_subfolders(
        &self,
        ctx: &RequestContext,
        params: &SearchParams,
    ) -> AppResult<PageResponse<Child>> {
        let params = SearchParams {
            include_applications: false,
            ..params.clone()
        };
        self.run(ctx, "folder service: search subfolders", async {
            self.search.search(&params).await
        })
        .await
    }

    /// Create a folder.
    #[instrument(skip(self, ctx, new_folder), fields(request_id = %ctx.request_id, name = %new_folder.name))]
    pub async fn create(&self, ctx: &RequestContext, new_folder: &NewFolder) -> AppResult<FolderId> {
        self.run(ctx, "folder service: create", async {
            let actor = ctx.require_actor()?;
            self.mutator.create(actor, new_folder).await
        })
        .await
    }

    /// Change a folder's name, path, description, and visibility.
    #[instrument(skip(self, ctx, fields), fields(request_id = %ctx.request_id))]
    pub async fn update_basic(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        fields: &UpdateFolder,
    ) -> AppResult<()> {
        self.run(ctx, "folder service: update", async {
            let actor = ctx.require_actor()?;
            self.mutator.update_basic(actor, id, fields).await
        })
        .await
    }

    /// Move a folder under a new parent.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn reparent(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        new_parent: FolderId,
    ) -> AppResult<()> {
        self.run(ctx, "folder service: transfer", async {
            let actor = ctx.require_actor()?;
            self.mutator.reparent(actor, id, new_parent).await
        })
        .await
    }

    /// Delete a folder that has no subfolders.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn delete(&self, ctx: &RequestContext, id: FolderId) -> AppResult<u64> {
        self.run(ctx, "folder service: delete", async {
            let actor = ctx.require_actor()?;
            self.mutator.delete(actor, id).await
        })
        .await
    }

    /// Every folder the caller may see, with full identifiers.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list_authorized(&self, ctx: &RequestContext) -> AppResult<Vec<FolderView>> {
        self.run(ctx, "folder service: list authorized", async {
            let actor = ctx.require_actor()?;
            let all = self.folders.find_all().await?;
            let fulls = full::index(&all);
            let visible = self.authz.filter_visible(actor, all).await?;

            Ok(visible
                .iter()
                .filter_map(|folder| match fulls.get(&folder.id) {
                    Some(full) => Some(FolderView::new(folder, full.clone())),
                    None => {
                        warn!(folder_id = %folder.id, "Skipping folder with unresolvable ancestors");
                        None
                    }
                })
                .collect())
        })
        .await
    }

    /// Drive `operation` under the caller's cancellation token and the
    /// configured deadline, tagging any error with `op`.
    async fn run<T>(
        &self,
        ctx: &RequestContext,
        op: &'static str,
        operation: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let deadline = Duration::from_secs(self.config.request_timeout_seconds);
        let result = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => Err(AppError::cancelled("Request was cancelled")),
            outcome = tokio::time::timeout(deadline, operation) => match outcome {
                Ok(result) => result,
                Err(_) => Err(AppError::cancelled(format!(
                    "Request exceeded its {}s deadline",
                    self.config.request_timeout_seconds
                ))),
            },
        };

        if let Err(e) = &result {
            if e.is(ErrorKind::MalformedTraversal) {
                error!(operation = op, error = %e, "Corrupt traversal ids encountered");
            }
        }
        result.with_operation(op)
    }
}
