//! # canopy-entity
//!
//! Domain entity models for Canopy. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; the derived tree nodes in [`child`] are built per
//! request and never persisted.

pub mod application;
pub mod child;
pub mod cluster;
pub mod folder;
pub mod member;

pub use application::Application;
pub use child::{Child, ChildDetail, ChildKind, FolderView, Full};
pub use cluster::Cluster;
pub use folder::{Folder, NewFolder, TraversalIds, UpdateFolder, VisibilityLevel};
pub use member::{Member, ResourceType, Role};
