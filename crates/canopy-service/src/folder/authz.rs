//! Membership-based visibility filtering of folder lists.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use canopy_core::result::AppResult;
use canopy_database::MembershipProvider;
use canopy_entity::{Folder, ResourceType, Role};

use crate::context::Actor;

/// Keeps the folders a caller holds a sufficient role on.
#[derive(Clone)]
pub struct AuthorizationFilter {
    membership: Arc<dyn MembershipProvider>,
    concurrency: usize,
}

impl AuthorizationFilter {
    /// Creates a new filter issuing at most `concurrency` lookups at once.
    pub fn new(membership: Arc<dyn MembershipProvider>, concurrency: usize) -> Self {
        Self {
            membership,
            concurrency: concurrency.max(1),
        }
    }

    /// Administrators see everything. Everyone else sees the folders on which
    /// they are owner, maintainer, or project engineer. Input order is kept.
    pub async fn filter_visible(&self, actor: &Actor, folders: Vec<Folder>) -> AppResult<Vec<Folder>> {
        if actor.is_admin {
            return Ok(folders);
        }

        let roles: Vec<Option<Role>> = stream::iter(folders.iter().map(|folder| {
            self.membership
                .get_role(actor.user_id, ResourceType::Group, folder.id.get())
        }))
        .buffered(self.concurrency)
        .try_collect()
        .await?;

        let total = folders.len();
        let visible: Vec<Folder> = folders
            .into_iter()
            .zip(roles)
            .filter(|(_, role)| role.is_some_and(|r| r.sees_folder()))
            .map(|(folder, _)| folder)
            .collect();

        debug!(
            user_id = %actor.user_id,
            total,
            visible = visible.len(),
            "Filtered folders by membership"
        );
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use canopy_core::error::{AppError, ErrorKind};
    use canopy_core::types::{FolderId, UserId};
    use canopy_database::MemoryStore;

    use crate::testing::folder;

    fn folders() -> Vec<Folder> {
        vec![
            folder(1, "A", "a", 0, "1"),
            folder(2, "B", "b", 1, "1,2"),
            folder(3, "C", "c", 0, "3"),
            folder(4, "D", "d", 0, "4"),
        ]
    }

    #[tokio::test]
    async fn test_admin_sees_everything() {
        let filter = AuthorizationFilter::new(Arc::new(MemoryStore::new()), 4);
        let admin = Actor::new(UserId(1), "root", true);
        assert_eq!(filter.filter_visible(&admin, folders()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_roles_decide_visibility() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId(9);
        store.grant(user, ResourceType::Group, 1, Role::Owner).await;
        store.grant(user, ResourceType::Group, 2, Role::Developer).await;
        store.grant(user, ResourceType::Group, 3, Role::Pe).await;
        store.grant(user, ResourceType::Application, 4, Role::Owner).await;

        let filter = AuthorizationFilter::new(store, 2);
        let actor = Actor::new(user, "bob", false);
        let ids: Vec<FolderId> = filter
            .filter_visible(&actor, folders())
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![FolderId(1), FolderId(3)]);
    }

    struct Unavailable;

    #[async_trait]
    impl MembershipProvider for Unavailable {
        async fn get_role(&self, _: UserId, _: ResourceType, _: i64) -> AppResult<Option<Role>> {
            Err(AppError::store("membership service unavailable"))
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let filter = AuthorizationFilter::new(Arc::new(Unavailable), 4);
        let actor = Actor::new(UserId(9), "bob", false);
        let err = filter.filter_visible(&actor, folders()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Store);
    }
}
