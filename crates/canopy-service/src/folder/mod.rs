//! Folder tree engine: identifiers, listings, path resolution, search,
//! mutations, and visibility filtering.

pub mod authz;
pub mod children;
pub mod full;
pub mod mutator;
pub mod resolver;
pub mod search;
pub mod service;

pub use authz::AuthorizationFilter;
pub use children::ChildCompositor;
pub use mutator::TreeMutator;
pub use resolver::PathResolver;
pub use search::{SearchEngine, SearchParams};
pub use service::FolderService;
