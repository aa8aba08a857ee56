//! Derived tree nodes returned by listings, path resolution, and search.

pub mod node;
pub mod view;

pub use node::{Child, ChildDetail, ChildKind, Full};
pub use view::FolderView;
