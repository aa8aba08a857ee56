//! Integration tests for fuzzy search.

use canopy_core::types::{FolderId, PageRequest};
use canopy_entity::ChildKind;
use canopy_service::SearchParams;

use crate::helpers::TestApp;

fn params(scope: FolderId, filter: &str) -> SearchParams {
    SearchParams {
        scope,
        filter: filter.to_string(),
        page: PageRequest::default(),
        include_applications: true,
    }
}

#[tokio::test]
async fn test_search_example() {
    let app = TestApp::new().await;
    let result = app
        .service
        .search(&app.ctx(), &params(FolderId::ROOT, "app"))
        .await
        .unwrap();

    assert_eq!(result.total_items, 1);
    let a = &result.items[0];
    assert_eq!((a.id, a.children_count), (1, 1));
    let children = a.children.as_ref().unwrap();
    assert_eq!(children[0].kind(), ChildKind::Application);
    assert_eq!(children[0].id, 10);
}

#[tokio::test]
async fn test_siblings_folder_before_application() {
    let app = TestApp::new().await;
    app.create("Apple", "apple", FolderId(1)).await;

    let result = app
        .service
        .search(&app.ctx(), &params(FolderId::ROOT, "ap"))
        .await
        .unwrap();
    let children = result.items[0].children.as_ref().unwrap();
    let ranks: Vec<u8> = children.iter().map(|c| c.kind().rank()).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(children[0].kind(), ChildKind::Folder);
}

#[tokio::test]
async fn test_top_level_ordered_by_recency() {
    let app = TestApp::new().await;
    app.create("Team Alpha", "alpha", FolderId::ROOT).await;
    app.create("Team Beta", "beta", FolderId::ROOT).await;
    app.create("Team Gamma", "gamma", FolderId(2)).await;

    let result = app
        .service
        .search(&app.ctx(), &params(FolderId::ROOT, "team"))
        .await
        .unwrap();
    assert_eq!(result.total_items, 3);
    assert!(
        result
            .items
            .windows(2)
            .all(|w| w[0].updated_at >= w[1].updated_at)
    );

    // Gamma is reached through A and B.
    let a = result.items.iter().find(|c| c.id == 1).unwrap();
    let b = &a.children.as_ref().unwrap()[0];
    assert_eq!(b.children.as_ref().unwrap()[0].full_path, "/a/b/gamma");
}

#[tokio::test]
async fn test_scoped_search_stays_inside_scope() {
    let app = TestApp::new().await;
    let inner = app.create("Inner", "inner", FolderId(2)).await;
    app.create("Inner Top", "inner-top", FolderId::ROOT).await;

    let result = app
        .service
        .search_subfolders(&app.ctx(), &params(FolderId(1), "inner"))
        .await
        .unwrap();
    assert_eq!(result.total_items, 1);
    let b = &result.items[0];
    assert_eq!(b.id, 2);
    assert_eq!(b.children.as_ref().unwrap()[0].id, inner.get());
}

#[tokio::test]
async fn test_empty_filter_falls_back_to_listing() {
    let app = TestApp::new().await;
    let result = app
        .service
        .search(&app.ctx(), &params(FolderId(1), ""))
        .await
        .unwrap();
    assert_eq!(result.total_items, 2);
}
