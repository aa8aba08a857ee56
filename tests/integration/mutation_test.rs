//! Integration tests for create, update, transfer, and delete.

use canopy_core::error::ErrorKind;
use canopy_core::types::FolderId;
use canopy_entity::{NewFolder, UpdateFolder, VisibilityLevel};
use canopy_service::RequestContext;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_delete_example() {
    let app = TestApp::new().await;
    let ctx = app.ctx();

    let err = app.service.delete(&ctx, FolderId(1)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HasChildren);
    assert_eq!(err.operation, Some("folder service: delete"));
    assert_eq!(app.chain(FolderId(1)).await, "1");

    assert_eq!(app.service.delete(&ctx, FolderId(2)).await.unwrap(), 1);
    let err = app.service.delete(&ctx, FolderId(2)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_applications_do_not_block_delete() {
    let app = TestApp::new().await;
    let ctx = app.ctx();
    app.service.delete(&ctx, FolderId(2)).await.unwrap();
    assert_eq!(app.service.delete(&ctx, FolderId(1)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_transfer_rejects_cycles() {
    let app = TestApp::new().await;
    let c = app.create("C", "c", FolderId(2)).await;

    for target in [FolderId(1), FolderId(2), c] {
        let err = app
            .service
            .reparent(&app.ctx(), FolderId(1), target)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cycle);
    }
    assert_eq!(app.chain(FolderId(1)).await, "1");
    assert_eq!(app.chain(FolderId(2)).await, "1,2");
    assert_eq!(app.chain(c).await, format!("1,2,{c}"));
}

#[tokio::test]
async fn test_transfer_moves_subtree() {
    let app = TestApp::new().await;
    let c = app.create("C", "c", FolderId(2)).await;
    let target = app.create("T", "t", FolderId::ROOT).await;

    app.service
        .reparent(&app.ctx(), FolderId(2), target)
        .await
        .unwrap();

    assert_eq!(app.chain(FolderId(2)).await, format!("{target},2"));
    assert_eq!(app.chain(c).await, format!("{target},2,{c}"));

    let ctx = app.ctx();
    assert_eq!(app.service.resolve(&ctx, "/t/b/c").await.unwrap().id, c.get());
    let err = app.service.resolve(&ctx, "/a/b").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_and_update_then_resolve() {
    let app = TestApp::new().await;
    let ctx = app.ctx();

    let new_folder = NewFolder {
        name: "Ops".to_string(),
        path: "ops".to_string(),
        parent_id: FolderId(2),
        visibility_level: VisibilityLevel::Internal,
        description: "operations".to_string(),
    };
    let id = app.service.create(&ctx, &new_folder).await.unwrap();
    assert_eq!(app.chain(id).await, format!("1,2,{id}"));

    let err = app.service.create(&ctx, &new_folder).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let fields = UpdateFolder {
        name: "Operations".to_string(),
        path: "operations".to_string(),
        visibility_level: VisibilityLevel::Public,
        description: String::new(),
    };
    app.service.update_basic(&ctx, id, &fields).await.unwrap();

    let child = app.service.resolve(&ctx, "/a/b/operations").await.unwrap();
    assert_eq!(child.id, id.get());
    assert_eq!(child.full_name, "/A/B/Operations");
}

#[tokio::test]
async fn test_mutations_need_a_caller() {
    let app = TestApp::new().await;
    let anonymous = RequestContext::anonymous();

    let err = app
        .service
        .reparent(&anonymous, FolderId(2), FolderId::ROOT)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
    assert_eq!(app.chain(FolderId(2)).await, "1,2");
}
