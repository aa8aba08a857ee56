//! Integration tests for child listings.

use canopy_core::types::{FolderId, PageRequest};
use canopy_entity::ChildKind;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_list_children_example() {
    let app = TestApp::new().await;
    let page = app
        .service
        .list_children(&app.ctx(), FolderId(1), PageRequest::default(), true)
        .await
        .unwrap();

    assert_eq!(page.total_items, 2);
    assert_eq!(page.items[0].kind(), ChildKind::Folder);
    assert_eq!(page.items[0].full_path, "/a/b");
    assert_eq!(page.items[0].children_count, 0);
    assert_eq!(page.items[1].kind(), ChildKind::Application);
    assert_eq!(page.items[1].full_path, "/a/app1");
}

#[tokio::test]
async fn test_children_count_matches_subfolders() {
    let app = TestApp::new().await;
    for (name, path) in [("X", "x"), ("Y", "y"), ("Z", "z")] {
        app.create(name, path, FolderId(2)).await;
    }

    let root = app
        .service
        .list_children(&app.ctx(), FolderId::ROOT, PageRequest::default(), true)
        .await
        .unwrap();
    for child in &root.items {
        let subfolders = app
            .service
            .list_subfolders(&app.ctx(), FolderId(child.id), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(child.children_count as u64, subfolders.total_items);
    }

    let b = app.service.get_by_id(&app.ctx(), FolderId(2)).await.unwrap();
    assert_eq!(b.children_count, 3);
}

#[tokio::test]
async fn test_paging_reports_full_total() {
    let app = TestApp::new().await;
    for i in 0..5 {
        app.create(&format!("S{i}"), &format!("s{i}"), FolderId(1)).await;
    }

    let second = app
        .service
        .list_children(&app.ctx(), FolderId(1), app.service.page_request(2, Some(3)), true)
        .await
        .unwrap();
    assert_eq!(second.total_items, 7);
    assert_eq!(second.items.len(), 3);
    assert_eq!(second.total_pages(), 3);
    // Folders come first, so the application is on the last page.
    assert!(second.items.iter().all(|c| c.kind() == ChildKind::Folder));
}
