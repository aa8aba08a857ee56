//! Shared test helpers for integration tests.

use std::sync::Arc;

use chrono::Utc;

use canopy_core::config::ServiceConfig;
use canopy_core::types::{ApplicationId, FolderId, UserId};
use canopy_database::{FolderStore, MemoryStore};
use canopy_entity::{Application, NewFolder, VisibilityLevel};
use canopy_service::{Actor, FolderService, RequestContext};

/// Test application context
pub struct TestApp {
    /// Backing store, for seeding and direct inspection
    pub store: Arc<MemoryStore>,
    /// The service under test
    pub service: FolderService,
}

impl TestApp {
    /// An empty namespace.
    pub fn empty() -> Self {
        let store = Arc::new(MemoryStore::new());
        let service = FolderService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            ServiceConfig::default(),
        );
        Self { store, service }
    }

    /// `A(1, a) ⊃ {B(2, b), app1(10) ⊃ c1}`.
    pub async fn new() -> Self {
        let app = Self::empty();
        let a = app.create("A", "a", FolderId::ROOT).await;
        let b = app.create("B", "b", a).await;
        assert_eq!((a, b), (FolderId(1), FolderId(2)));

        let now = Utc::now();
        app.store
            .insert_application(Application {
                id: ApplicationId(10),
                name: "app1".to_string(),
                group_id: a,
                created_at: now,
                updated_at: now,
            })
            .await;
        app.store.add_cluster("c1", ApplicationId(10)).await;
        app
    }

    /// Context of a regular user.
    pub fn ctx(&self) -> RequestContext {
        RequestContext::new(Actor::new(UserId(7), "tester", false))
    }

    /// Context of an administrator.
    pub fn admin(&self) -> RequestContext {
        RequestContext::new(Actor::new(UserId(1), "admin", true))
    }

    /// Create a folder, panicking on failure.
    pub async fn create(&self, name: &str, path: &str, parent: FolderId) -> FolderId {
        let new_folder = NewFolder {
            name: name.to_string(),
            path: path.to_string(),
            parent_id: parent,
            visibility_level: VisibilityLevel::Private,
            description: String::new(),
        };
        self.service
            .create(&self.admin(), &new_folder)
            .await
            .expect("Failed to create folder")
    }

    /// The stored traversal ids of a folder.
    pub async fn chain(&self, id: FolderId) -> String {
        FolderStore::find_by_id(self.store.as_ref(), id)
            .await
            .expect("store read")
            .expect("folder exists")
            .traversal_ids
    }
}
