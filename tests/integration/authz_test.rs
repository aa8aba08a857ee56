//! Integration tests for the authorized folder listing.

use canopy_core::error::ErrorKind;
use canopy_core::types::{FolderId, UserId};
use canopy_entity::{ResourceType, Role};
use canopy_service::RequestContext;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_members_see_owned_folders_only() {
    let app = TestApp::new().await;
    let other = app.create("Other", "other", FolderId::ROOT).await;
    let user = UserId(7);
    app.store
        .grant(user, ResourceType::Group, 1, Role::Owner)
        .await;
    app.store
        .grant(user, ResourceType::Group, 2, Role::Guest)
        .await;
    app.store
        .grant(user, ResourceType::Group, other.get(), Role::Maintainer)
        .await;

    let views = app.service.list_authorized(&app.ctx()).await.unwrap();
    let paths: Vec<&str> = views.iter().map(|v| v.full_path.as_str()).collect();
    assert_eq!(paths, vec!["/a", "/other"]);
}

#[tokio::test]
async fn test_admin_sees_all_folders() {
    let app = TestApp::new().await;
    let views = app.service.list_authorized(&app.admin()).await.unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[1].full_name, "/A/B");
}

#[tokio::test]
async fn test_listing_requires_a_caller() {
    let app = TestApp::new().await;
    let err = app
        .service
        .list_authorized(&RequestContext::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
}
