//! Integration tests for path resolution.

use canopy_core::error::ErrorKind;
use canopy_core::types::FolderId;
use canopy_entity::{ChildKind, TraversalIds};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_resolve_example_paths() {
    let app = TestApp::new().await;
    let ctx = app.ctx();

    let b = app.service.resolve(&ctx, "/a/b").await.unwrap();
    assert_eq!((b.kind(), b.id), (ChildKind::Folder, 2));

    let app1 = app.service.resolve(&ctx, "/a/app1").await.unwrap();
    assert_eq!((app1.kind(), app1.id), (ChildKind::Application, 10));
    assert_eq!(app1.full_name, "/A/app1");

    let c1 = app.service.resolve(&ctx, "/a/app1/c1").await.unwrap();
    assert_eq!(c1.kind(), ChildKind::Cluster);
    assert_eq!(c1.full_path, "/a/app1/c1");
}

#[tokio::test]
async fn test_nonexistent_path_is_not_found() {
    let app = TestApp::new().await;
    let ctx = app.ctx();

    for path in ["/a/b/c", "/b", "/a/app2", "/a/app1/c2", ""] {
        let err = app.service.resolve(&ctx, path).await.expect_err(path);
        assert_eq!(err.kind, ErrorKind::NotFound, "{path}");
        assert_eq!(err.operation, Some("folder service: resolve"));
    }
}

#[tokio::test]
async fn test_every_folder_resolves_by_full_path() {
    let app = TestApp::new().await;
    let c = app.create("C", "c", FolderId(2)).await;
    app.create("D", "d", c).await;
    app.create("E", "e", FolderId::ROOT).await;

    let views = app.service.list_authorized(&app.admin()).await.unwrap();
    assert_eq!(views.len(), 5);

    for view in views {
        assert!(view.full_path.starts_with('/'));

        let chain = TraversalIds::decode(&view.traversal_ids).unwrap();
        assert_eq!(chain.leaf(), view.id);
        assert_eq!(chain.len(), view.full_path.matches('/').count());

        let resolved = app.service.resolve(&app.ctx(), &view.full_path).await.unwrap();
        assert_eq!(resolved.kind(), ChildKind::Folder);
        assert_eq!(resolved.id, view.id.get());
    }
}
