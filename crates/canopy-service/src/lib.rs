//! # canopy-service
//!
//! The hierarchical resource tree engine. Each component receives its
//! stores at construction time via `Arc` trait objects;
//! [`FolderService`] composes them and applies cancellation, deadlines,
//! and operation tagging to every call.

pub mod context;
pub mod folder;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{Actor, RequestContext};
pub use folder::{
    AuthorizationFilter, ChildCompositor, FolderService, PathResolver, SearchEngine, SearchParams,
    TreeMutator,
};
