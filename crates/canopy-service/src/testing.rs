//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use canopy_core::types::{ApplicationId, ClusterId, FolderId, UserId};
use canopy_database::MemoryStore;
use canopy_entity::{Application, Cluster, Folder, VisibilityLevel};

pub(crate) fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub(crate) fn folder(id: i64, name: &str, path: &str, parent: i64, chain: &str) -> Folder {
    Folder {
        id: FolderId(id),
        name: name.to_string(),
        path: path.to_string(),
        description: String::new(),
        visibility_level: VisibilityLevel::Private,
        parent_id: FolderId(parent),
        traversal_ids: chain.to_string(),
        created_by: UserId(1),
        updated_by: UserId(1),
        created_at: at(0),
        updated_at: at(id),
    }
}

pub(crate) fn application(id: i64, name: &str, group: i64, minutes: i64) -> Application {
    Application {
        id: ApplicationId(id),
        name: name.to_string(),
        group_id: FolderId(group),
        created_at: at(0),
        updated_at: at(minutes),
    }
}

pub(crate) fn cluster(id: i64, name: &str, application: i64) -> Cluster {
    Cluster {
        id: ClusterId(id),
        name: name.to_string(),
        application_id: ApplicationId(application),
        created_at: at(0),
        updated_at: at(0),
    }
}

/// `A(1,a) ⊃ {B(2,b), app1(10) ⊃ c1(100)}`.
pub(crate) async fn scenario() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_folder(folder(1, "A", "a", 0, "1")).await;
    store.insert_folder(folder(2, "B", "b", 1, "1,2")).await;
    store.insert_application(application(10, "app1", 1, 5)).await;
    store.insert_cluster(cluster(100, "c1", 10)).await;
    store
}
